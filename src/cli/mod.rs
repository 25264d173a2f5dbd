pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use crate::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "blogicum-manage")]
#[command(about = "Blogicum management commands - migrations, accounts and catalog")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Check database connectivity")]
    Check,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Category management")]
    Category {
        #[command(subcommand)]
        cmd: commands::category::CategoryCommands,
    },

    #[command(about = "Location management")]
    Location {
        #[command(subcommand)]
        cmd: commands::location::LocationCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database = &config::config().database;
    tracing::debug!("Connecting to {}", DatabaseManager::redacted_url(&database.url));
    Ok(DatabaseManager::connect(database).await?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let pool = connect().await?;

    match cli.command {
        Commands::Migrate => commands::db::migrate(&pool, output_format).await,
        Commands::Check => commands::db::check(&pool, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &pool, output_format).await,
        Commands::Category { cmd } => commands::category::handle(cmd, &pool, output_format).await,
        Commands::Location { cmd } => commands::location::handle(cmd, &pool, output_format).await,
    }
}
