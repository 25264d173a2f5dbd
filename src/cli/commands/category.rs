use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;

use crate::blog::forms::CategoryForm;
use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::database::categories;

#[derive(Subcommand)]
pub enum CategoryCommands {
    #[command(about = "Create a category")]
    Create {
        #[arg(help = "Category title")]
        title: String,

        #[arg(long, help = "URL slug (derived from the title when omitted)")]
        slug: Option<String>,

        #[arg(long, default_value = "", help = "Category description")]
        description: String,

        #[arg(long, help = "Create hidden from the site")]
        unpublished: bool,
    },
}

pub async fn handle(cmd: CategoryCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CategoryCommands::Create { title, slug, description, unpublished } => {
            let description = if description.trim().is_empty() { title.clone() } else { description };
            let draft = CategoryForm {
                title: Some(title),
                description: Some(description),
                slug,
                is_published: Some(!unpublished),
            }
            .into_draft()
            .map_err(|e| anyhow::anyhow!("{}", e.to_json()))?;

            if categories::slug_taken(pool, &draft.slug, None).await? {
                anyhow::bail!("Category with slug '{}' already exists", draft.slug);
            }

            let category = categories::insert(pool, &draft.as_new()).await?;
            output_success(output_format, &format!("Created category '{}'", category.title), Some(&category))?;
            output_fields(
                output_format,
                &[("id", json!(category.id)), ("slug", json!(category.slug)), ("published", json!(category.is_published))],
            );
            Ok(())
        }
    }
}
