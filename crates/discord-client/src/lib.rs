//! Discord integration client library.
//!
//! Provides the Gateway WebSocket client and the REST API client
//! used by the echo bot.

pub mod api;
pub mod gateway;
pub mod models;

pub use models::{Channel, Embed, EmbedField, EmbedFooter, Message, Snowflake, User};

/// Unified error type for the discord-client crate.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: bot token rejected")]
    AuthRequired,

    #[error("Discord API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway closed (code {code}): {reason}")]
    GatewayClosed { code: u16, reason: String },

    #[error("Connection timeout")]
    Timeout,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl DiscordError {
    /// True when the platform reported the target (message, channel) as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscordError::ApiError { status: 404, .. })
    }
}

/// Gateway intents required by this bot.
pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_GUILD_MESSAGE_REACTIONS: u64 = 1 << 10;
pub const INTENT_DIRECT_MESSAGES: u64 = 1 << 12;
pub const INTENT_DIRECT_MESSAGE_REACTIONS: u64 = 1 << 13;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

pub const DEFAULT_INTENTS: u64 = INTENT_GUILDS
    | INTENT_GUILD_MESSAGES
    | INTENT_GUILD_MESSAGE_REACTIONS
    | INTENT_DIRECT_MESSAGES
    | INTENT_DIRECT_MESSAGE_REACTIONS
    | INTENT_MESSAGE_CONTENT;
