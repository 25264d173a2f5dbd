use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::hash_password_async;
use crate::blog::forms::RegistrationForm;
use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::users::{self, NewUser};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, default_value = "", help = "Email address")]
        email: String,

        #[arg(long, help = "Grant staff (admin) access")]
        staff: bool,

        #[arg(long, env = "BLOGICUM_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Grant or revoke staff access")]
    SetStaff {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, help = "Revoke instead of grant")]
        revoke: bool,
    },
}

pub async fn handle(cmd: UserCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { username, email, staff, password } => {
            // Same rules as web registration
            let form = RegistrationForm {
                username: username.clone(),
                password1: password.clone(),
                password2: password.clone(),
                email: email.clone(),
                ..Default::default()
            };
            form.validate(config::config().security.min_password_length)
                .map_err(|e| anyhow::anyhow!("{}", e.to_json()))?;

            if users::username_taken(pool, &username, None).await? {
                anyhow::bail!("User '{}' already exists", username);
            }

            let password_hash = hash_password_async(password.clone()).await?;
            let user = users::insert(
                pool,
                &NewUser {
                    username: &username,
                    email: &email,
                    first_name: "",
                    last_name: "",
                    password_hash: &password_hash,
                    is_staff: staff,
                },
            )
            .await?;

            output_success(output_format, &format!("Created user '{}'", user.username), Some(&user))?;
            output_fields(output_format, &[("id", json!(user.id)), ("staff", json!(user.is_staff))]);
            Ok(())
        }
        UserCommands::SetStaff { username, revoke } => {
            let user = users::set_staff(pool, &username, !revoke).await?;
            let message = if user.is_staff {
                format!("Granted staff access to '{}'", user.username)
            } else {
                format!("Revoked staff access from '{}'", user.username)
            };
            output_success(output_format, &message, Some(&user))
        }
    }
}
