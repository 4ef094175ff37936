//! Gateway event dispatcher.
//!
//! Connects to the gateway, turns `MESSAGE_CREATE` events into command
//! invocations and forwards reaction events to waiting paginators.
//! Each command runs in its own task so a paginator waiting for input
//! never blocks other invocations.

use std::time::Duration;

use discord_client::gateway::{
    EVENT_MESSAGE_CREATE, EVENT_MESSAGE_REACTION_ADD, EVENT_READY, EVENT_RESUMED, GatewayClient,
    GatewayConfig, GatewayEvent,
};
use discord_client::models::{ReactionAdd, Ready};
use discord_client::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::app::SharedState;
use crate::commands::{self, Invocation};
use crate::error::CommandError;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Why an event stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Shutdown was requested.
    Shutdown,
    /// The gateway gave up for good (bad token, disallowed intents).
    Fatal,
    /// The gateway loop exited and may be restarted.
    Closed,
}

/// Run the dispatcher until the shutdown token is cancelled.
///
/// Reconnects if the gateway event stream ends, except after a fatal
/// gateway error, which cancels the shutdown token instead.
pub async fn run(state: SharedState) {
    let shutdown = state.shutdown_token().clone();
    loop {
        tracing::info!("Starting gateway connection");
        let config = GatewayConfig::new(state.config().token.clone());

        match GatewayClient::connect(config).await {
            Ok((event_rx, shutdown_tx)) => {
                let end = process_events(&state, event_rx, shutdown_tx).await;
                if !should_reconnect(&state, end) {
                    break;
                }
                tracing::warn!("Gateway event stream ended, will reconnect");
            }
            Err(e) => {
                tracing::error!("Gateway connection failed: {e}");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(RECONNECT_DELAY) => {}
        }
    }
    tracing::info!("Dispatcher stopped");
}

/// Decide what follows a finished stream. A fatal end stops the whole bot.
fn should_reconnect(state: &SharedState, end: StreamEnd) -> bool {
    match end {
        StreamEnd::Shutdown => false,
        StreamEnd::Fatal => {
            tracing::error!("Gateway cannot reconnect; shutting down");
            state.shutdown_token().cancel();
            false
        }
        StreamEnd::Closed => !state.shutdown_token().is_cancelled(),
    }
}

/// Process events until the channel closes or shutdown is requested.
async fn process_events(
    state: &SharedState,
    mut events: mpsc::Receiver<GatewayEvent>,
    shutdown_tx: mpsc::Sender<()>,
) -> StreamEnd {
    let shutdown = state.shutdown_token();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                if shutdown_tx.send(()).await.is_ok() {
                    tracing::info!("Gateway stop signal sent");
                }
                return StreamEnd::Shutdown;
            }
            event = events.recv() => {
                let Some(event) = event else { return StreamEnd::Closed };
                if event.is_fatal() {
                    tracing::error!(payload = %event.payload, "Gateway stopped with a fatal error");
                    return StreamEnd::Fatal;
                }
                handle_event(state, event);
            }
        }
    }
}

/// Dispatch one gateway event. Returns the spawned task for command messages.
pub fn handle_event(state: &SharedState, event: GatewayEvent) -> Option<JoinHandle<()>> {
    match event.event_type.as_str() {
        EVENT_READY => {
            match serde_json::from_value::<Ready>(event.payload) {
                Ok(ready) => {
                    tracing::info!(
                        user = %ready.user.username,
                        user_id = %ready.user.id,
                        "Connected to gateway"
                    );
                    state.set_bot_user_id(ready.user.id);
                }
                Err(e) => tracing::warn!("Malformed READY payload: {e}"),
            }
            None
        }
        EVENT_RESUMED => {
            tracing::info!("Gateway session resumed");
            None
        }
        EVENT_MESSAGE_CREATE => match serde_json::from_value::<Message>(event.payload) {
            Ok(message) => handle_message(state, message),
            Err(e) => {
                tracing::warn!("Malformed MESSAGE_CREATE payload: {e}");
                None
            }
        },
        EVENT_MESSAGE_REACTION_ADD => {
            match serde_json::from_value::<ReactionAdd>(event.payload) {
                Ok(reaction) => handle_reaction(state, reaction),
                Err(e) => tracing::warn!("Malformed MESSAGE_REACTION_ADD payload: {e}"),
            }
            None
        }
        other => {
            tracing::trace!(event_type = other, "Gateway event ignored");
            None
        }
    }
}

fn handle_message(state: &SharedState, message: Message) -> Option<JoinHandle<()>> {
    if message.author.bot {
        return None;
    }

    let parsed = commands::parse(&message.content, &state.config().command_prefix)?;
    let invocation = Invocation::from_message(&message);
    let state = state.clone();

    Some(tokio::spawn(async move {
        let (name, result) = match parsed {
            Ok(command) => {
                let name = command.name();
                tracing::debug!(
                    command = name,
                    user_id = %invocation.user_id,
                    channel_id = %invocation.channel_id,
                    "Running command"
                );
                (name, commands::execute(&state, &invocation, command).await)
            }
            Err(CommandError::UnknownCommand(name)) => {
                tracing::debug!(command = %name, "Unknown command ignored");
                return;
            }
            Err(e) => ("parse", Err(e)),
        };
        if let Err(e) = result {
            commands::report_failure(&state, &invocation, name, e).await;
        }
    }))
}

fn handle_reaction(state: &SharedState, reaction: ReactionAdd) {
    if state.bot_user_id() == Some(reaction.user_id) {
        return;
    }
    let message_id = reaction.message_id;
    if state.reactions().route(reaction) {
        tracing::trace!(%message_id, "Reaction routed to paginator");
    }
}
