//! Gateway WebSocket client for real-time Discord events.
//!
//! Connects to wss://gateway.discord.gg, handles hello/heartbeat/dispatch
//! frames, resumes dropped sessions, and manages automatic reconnection
//! with exponential backoff.

mod connection;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::DiscordError;

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const GATEWAY_QUERY: &str = "?v=10&encoding=json";
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);
const MAX_CONSECUTIVE_FAILURES_BEFORE_RESTART: u32 = 8;

/// Dispatch event names the bot consumes.
pub const EVENT_READY: &str = "READY";
pub const EVENT_RESUMED: &str = "RESUMED";
pub const EVENT_MESSAGE_CREATE: &str = "MESSAGE_CREATE";
pub const EVENT_MESSAGE_REACTION_ADD: &str = "MESSAGE_REACTION_ADD";
/// Emitted by this client, not Discord: the loop stopped and reconnecting
/// with the same credentials cannot succeed. Always the last event.
pub const EVENT_GATEWAY_FATAL: &str = "GATEWAY_FATAL";

/// A dispatch event received from the Gateway.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GatewayEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl GatewayEvent {
    pub(crate) fn fatal(error: &DiscordError) -> Self {
        let code = match error {
            DiscordError::GatewayClosed { code, .. } => Some(*code),
            DiscordError::AuthRequired => Some(4004),
            _ => None,
        };
        Self {
            event_type: EVENT_GATEWAY_FATAL.to_string(),
            payload: serde_json::json!({ "code": code, "reason": error.to_string() }),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.event_type == EVENT_GATEWAY_FATAL
    }
}

/// Gateway client configuration.
pub struct GatewayConfig {
    pub token: String,
    pub intents: u64,
}

impl GatewayConfig {
    pub fn new(token: String) -> Self {
        Self {
            token,
            intents: crate::DEFAULT_INTENTS,
        }
    }
}

/// Resumable session state carried across reconnects.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub session_id: Option<String>,
    pub resume_url: Option<String>,
    pub sequence: Option<u64>,
}

impl Session {
    fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    fn connect_url(&self) -> String {
        match (&self.resume_url, self.can_resume()) {
            (Some(url), true) => resume_endpoint(url),
            _ => GATEWAY_URL.to_string(),
        }
    }

    fn invalidate(&mut self) {
        *self = Session::default();
    }
}

/// Append the versioned query to a `resume_gateway_url`.
pub(crate) fn resume_endpoint(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.contains('?') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/{GATEWAY_QUERY}")
    }
}

/// Gateway WebSocket client with auto-reconnect.
///
/// Events are delivered via `mpsc::Receiver<GatewayEvent>`.
pub struct GatewayClient;

impl GatewayClient {
    /// Start the Gateway loop. Returns an event receiver and shutdown sender.
    pub async fn connect(
        config: GatewayConfig,
    ) -> Result<(mpsc::Receiver<GatewayEvent>, mpsc::Sender<()>), DiscordError> {
        let (event_tx, event_rx) = mpsc::channel::<GatewayEvent>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, event_tx, shutdown_rx));
        Ok((event_rx, shutdown_tx))
    }

    async fn run_loop(
        config: GatewayConfig,
        event_tx: mpsc::Sender<GatewayEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut session = Session::default();
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Gateway shutdown requested");
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Gateway failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&config, &mut session, &event_tx, &mut shutdown_rx).await {
                Ok(connection::SessionEnd::Shutdown) => {
                    tracing::info!("Gateway connection closed cleanly");
                    return;
                }
                Ok(connection::SessionEnd::Reconnect) => {
                    failures = 0;
                    tracing::info!(
                        resumable = session.can_resume(),
                        "Gateway asked for reconnect"
                    );
                }
                Err(e) => {
                    if Self::is_fatal(&e) {
                        tracing::error!(
                            error = %e,
                            "Gateway connection failed with a fatal error; terminating loop"
                        );
                        let _ = event_tx.send(GatewayEvent::fatal(&e)).await;
                        return;
                    }
                    if event_tx.is_closed() {
                        tracing::info!("Gateway event receiver dropped; stopping");
                        return;
                    }
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    if failures >= MAX_CONSECUTIVE_FAILURES_BEFORE_RESTART {
                        tracing::warn!(
                            failures,
                            "Gateway failures exceeded threshold; restarting client loop for full re-initialization"
                        );
                        return;
                    }
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Gateway connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Gateway shutdown requested during reconnect backoff");
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }

    fn is_fatal(error: &DiscordError) -> bool {
        match error {
            DiscordError::AuthRequired => true,
            DiscordError::GatewayClosed { code, .. } => connection::is_fatal_close_code(*code),
            _ => false,
        }
    }
}
