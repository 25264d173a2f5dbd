use clap::Subcommand;
use sqlx::PgPool;

use crate::blog::forms::LocationForm;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::locations;

#[derive(Subcommand)]
pub enum LocationCommands {
    #[command(about = "Create a location")]
    Create {
        #[arg(help = "Place name")]
        name: String,

        #[arg(long, help = "Create hidden from the site")]
        unpublished: bool,
    },
}

pub async fn handle(cmd: LocationCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LocationCommands::Create { name, unpublished } => {
            let (name, is_published) = LocationForm { name: Some(name), is_published: Some(!unpublished) }
                .into_new()
                .map_err(|e| anyhow::anyhow!("{}", e.to_json()))?;
            let location = locations::insert(pool, &name, is_published).await?;
            output_success(output_format, &format!("Created location '{}' (ID: {})", location.name, location.id), Some(&location))
        }
    }
}
