use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::{Instant as TokioInstant, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;

use super::*;
use crate::models::Ready;

pub(super) const OP_DISPATCH: u8 = 0;
pub(super) const OP_HEARTBEAT: u8 = 1;
pub(super) const OP_IDENTIFY: u8 = 2;
pub(super) const OP_RESUME: u8 = 6;
pub(super) const OP_RECONNECT: u8 = 7;
pub(super) const OP_INVALID_SESSION: u8 = 9;
pub(super) const OP_HELLO: u8 = 10;
pub(super) const OP_HEARTBEAT_ACK: u8 = 11;

#[derive(Debug, Deserialize)]
pub(super) struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelloPayload {
    heartbeat_interval: u64,
}

/// How a single connection ended without error.
pub(super) enum SessionEnd {
    Shutdown,
    Reconnect,
}

#[derive(Debug, PartialEq)]
pub(super) enum PayloadAction {
    Continue,
    HeartbeatNow,
    Acked,
    Reconnect,
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

impl GatewayClient {
    pub(super) async fn connect_once(
        config: &GatewayConfig,
        session: &mut Session,
        event_tx: &mpsc::Sender<GatewayEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<SessionEnd, DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        let ws_url = session.connect_url();
        tracing::info!(ws_url = %ws_url, "Connecting to Discord Gateway");
        let (mut ws, _) = connect_async(ws_url.as_str()).await?;
        let interval_ms = Self::wait_for_hello(&mut ws).await?;

        let handshake = if session.can_resume() {
            tracing::info!(session_id = ?session.session_id, "Resuming Gateway session");
            resume_payload(&config.token, session)
        } else {
            identify_payload(&config.token, config.intents)
        };
        ws.send(Msg::Text(handshake.to_string().into())).await?;

        let period = Duration::from_millis(interval_ms.max(1));
        let jitter = period.mul_f64(rand::random::<f64>());
        let mut heartbeat = tokio::time::interval_at(TokioInstant::now() + jitter, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut acked = true;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Gateway shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(SessionEnd::Shutdown);
                }
                _ = heartbeat.tick() => {
                    if !acked {
                        tracing::warn!("Gateway heartbeat not acknowledged; connection is zombied");
                        let _ = ws.close(None).await;
                        return Err(DiscordError::Timeout);
                    }
                    ws.send(Msg::Text(heartbeat_payload(session.sequence).to_string().into())).await?;
                    acked = false;
                }
                frame = ws.next() => {
                    match frame {
                        Some(Ok(Msg::Text(text))) => {
                            match Self::handle_payload(&text, session, event_tx).await? {
                                PayloadAction::Continue => {}
                                PayloadAction::Acked => acked = true,
                                PayloadAction::HeartbeatNow => {
                                    ws.send(Msg::Text(heartbeat_payload(session.sequence).to_string().into())).await?;
                                }
                                PayloadAction::Reconnect => {
                                    let _ = ws.close(None).await;
                                    return Ok(SessionEnd::Reconnect);
                                }
                            }
                        }
                        Some(Ok(Msg::Ping(data))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Some(Ok(Msg::Close(frame))) => {
                            return Err(Self::close_error(frame, session));
                        }
                        None => {
                            tracing::warn!("Gateway WebSocket closed by server");
                            return Err(DiscordError::Gateway("Server closed".into()));
                        }
                        Some(Err(e)) => return Err(DiscordError::WebSocket(e)),
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    async fn wait_for_hello(ws: &mut WsStream) -> Result<u64, DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;
        loop {
            match tokio::time::timeout(HELLO_TIMEOUT, ws.next()).await {
                Ok(Some(Ok(Msg::Text(text)))) => {
                    let payload: GatewayPayload = serde_json::from_str(&text)?;
                    if let Some(interval) = parse_hello_interval(&payload) {
                        tracing::info!(heartbeat_interval_ms = interval, "Gateway hello");
                        return Ok(interval);
                    }
                }
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => return Err(DiscordError::WebSocket(e)),
                Ok(None) => return Err(DiscordError::Gateway("Connection closed".into())),
                Err(_) => return Err(DiscordError::Timeout),
            }
        }
    }

    pub(super) async fn handle_payload(
        text: &str,
        session: &mut Session,
        event_tx: &mpsc::Sender<GatewayEvent>,
    ) -> Result<PayloadAction, DiscordError> {
        let payload: GatewayPayload = serde_json::from_str(text)?;
        match payload.op {
            OP_DISPATCH => {
                if let Some(seq) = payload.s {
                    session.sequence = Some(seq);
                }
                let Some(event_type) = payload.t else {
                    return Ok(PayloadAction::Continue);
                };
                if event_type == EVENT_READY {
                    let ready: Ready = serde_json::from_value(payload.d.clone())?;
                    tracing::info!(
                        user = %ready.user.username,
                        session_id = %ready.session_id,
                        "Gateway ready"
                    );
                    session.session_id = Some(ready.session_id);
                    session.resume_url = ready.resume_gateway_url;
                }
                tracing::debug!(event_type = %event_type, "Gateway dispatch");
                let _ = event_tx
                    .send(GatewayEvent {
                        event_type,
                        payload: payload.d,
                    })
                    .await;
                Ok(PayloadAction::Continue)
            }
            OP_HEARTBEAT => Ok(PayloadAction::HeartbeatNow),
            OP_HEARTBEAT_ACK => {
                tracing::trace!("Gateway heartbeat ack");
                Ok(PayloadAction::Acked)
            }
            OP_RECONNECT => {
                tracing::info!("Gateway reconnect requested");
                Ok(PayloadAction::Reconnect)
            }
            OP_INVALID_SESSION => {
                let resumable = payload.d.as_bool().unwrap_or(false);
                tracing::warn!(resumable, "Gateway session invalidated");
                if !resumable {
                    session.invalidate();
                }
                Ok(PayloadAction::Reconnect)
            }
            other => {
                tracing::debug!(op = other, "Unhandled Gateway opcode");
                Ok(PayloadAction::Continue)
            }
        }
    }

    fn close_error(frame: Option<CloseFrame>, session: &mut Session) -> DiscordError {
        let Some(frame) = frame else {
            tracing::warn!("Gateway closed without a close frame");
            return DiscordError::Gateway("Server closed".into());
        };
        let code = u16::from(frame.code);
        let reason = frame.reason.as_str().to_owned();
        tracing::warn!(code, reason = %reason, "Gateway closed by server");
        if code == 4004 {
            return DiscordError::AuthRequired;
        }
        if invalidates_session(code) {
            session.invalidate();
        }
        DiscordError::GatewayClosed { code, reason }
    }
}

pub(super) fn parse_hello_interval(payload: &GatewayPayload) -> Option<u64> {
    if payload.op != OP_HELLO {
        return None;
    }
    serde_json::from_value::<HelloPayload>(payload.d.clone())
        .ok()
        .map(|h| h.heartbeat_interval)
}

pub(super) fn heartbeat_payload(sequence: Option<u64>) -> Value {
    json!({ "op": OP_HEARTBEAT, "d": sequence })
}

pub(super) fn identify_payload(token: &str, intents: u64) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "echo-bot",
                "device": "echo-bot",
            },
        }
    })
}

pub(super) fn resume_payload(token: &str, session: &Session) -> Value {
    json!({
        "op": OP_RESUME,
        "d": {
            "token": token,
            "session_id": session.session_id,
            "seq": session.sequence,
        }
    })
}

/// Close codes after which reconnecting cannot succeed.
pub(super) fn is_fatal_close_code(code: u16) -> bool {
    matches!(code, 4004 | 4010 | 4011 | 4012 | 4013 | 4014)
}

/// Close codes after which the session cannot be resumed.
pub(super) fn invalidates_session(code: u16) -> bool {
    matches!(code, 4007 | 4009)
}
