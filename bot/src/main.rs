//! Echo bot binary.
//!
//! Connects to the gateway and serves prefix commands until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use discord_client::api::DiscordApiClient;
use tracing_subscriber::EnvFilter;

use echo_bot_lib::app::SharedState;
use echo_bot_lib::dispatcher;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting echo bot");

    let (db, config) = echo_bot_lib::init_foundation()?;
    let api = DiscordApiClient::new(&config.token)?;
    let state = SharedState::new(db, Arc::new(api), config);

    let s = state.clone();
    let dispatcher_handle = tokio::spawn(async move { dispatcher::run(s).await });

    let stopped_by_gateway = tokio::select! {
        r = tokio::signal::ctrl_c() => {
            r?;
            false
        }
        _ = state.shutdown_token().cancelled() => true,
    };
    tracing::info!("Shutdown sequence started");
    state.shutdown_token().cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, dispatcher_handle).await {
        Ok(_) => tracing::info!("Shutdown sequence completed"),
        Err(_) => tracing::warn!("Dispatcher did not stop in time"),
    }
    if stopped_by_gateway {
        anyhow::bail!("gateway connection failed permanently");
    }
    Ok(())
}
