//! Libris Server - Main entry point

use anyhow::{Context, Result};
use libris_common::logging::{init_logging, LogConfig};
use tracing::info;

use libris_server::{api, config::Config, db, features::FeatureState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("libris-server")
        .filter_directives("libris_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    info!("Starting Libris Server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        tracked = config.audit.tracked_types.len(),
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database migrations completed");

    let state = FeatureState::new(pool, config.audit.clone());
    api::serve(state, &config).await
}
