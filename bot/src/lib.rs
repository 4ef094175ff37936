pub mod app;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod paginator;
pub mod platform;
pub mod reactions;
pub mod render;
#[cfg(test)]
mod testing;

use echo_db::Database;

use crate::config::BotConfig;

/// Load `.env`, read the configuration and open the record store.
pub fn init_foundation() -> Result<(Database, BotConfig), anyhow::Error> {
    load_dotenv();
    let config = BotConfig::load()?;

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    tracing::info!("Opening database at {}", config.db_path.display());
    let db = Database::open(&config.db_path)?;

    tracing::info!(
        prefix = %config.command_prefix,
        pagination_timeout_secs = config.pagination_timeout.as_secs(),
        "Settings loaded"
    );
    Ok((db, config))
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
