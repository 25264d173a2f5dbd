use anyhow::Context;
use tracing_subscriber::EnvFilter;

use blogicum::app::{self, AppState};
use blogicum::config;
use blogicum::database::DatabaseManager;
use blogicum::media::MediaStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogicum=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Blogicum in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if blogicum::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("Using the built-in development JWT secret; set JWT_SECRET for shared deployments");
    }

    tracing::info!("Connecting to {}", DatabaseManager::redacted_url(&config.database.url));
    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let media = MediaStore::from_config(&config.media);
    tokio::fs::create_dir_all(media.root())
        .await
        .with_context(|| format!("failed to create media root {}", media.root().display()))?;

    let app = app::router(AppState::new(pool, media));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Blogicum listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
