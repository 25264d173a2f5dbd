use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn migrate(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::migrate(pool).await?;
    output_success::<()>(output_format, "Migrations applied", None)
}

pub async fn check(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::health_check(pool).await?;
    let url = DatabaseManager::redacted_url(&crate::config::config().database.url);
    output_success(output_format, "Database is reachable", Some(&json!({ "database": url })))
}
