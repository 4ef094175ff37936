//! Discord REST API client.
//!
//! Provides typed access to the message, reaction and channel endpoints
//! the bot needs, with `Authorization: Bot <token>` header injection.
//! Requests are attempted exactly once; non-2xx responses surface as
//! [`DiscordError::ApiError`].

mod channels;
mod messages;
mod reactions;
mod request;

pub use messages::MessagePayload;

use reqwest::header::HeaderValue;

use crate::DiscordError;

const API_BASE: &str = "https://discord.com/api/v10";

/// Discord REST client bound to one bot token.
#[derive(Clone)]
pub struct DiscordApiClient {
    pub(super) http: reqwest::Client,
    pub(super) authorization: HeaderValue,
    pub(super) base_url: String,
}

impl DiscordApiClient {
    pub fn new(bot_token: &str) -> Result<Self, DiscordError> {
        Self::with_base_url(bot_token, API_BASE)
    }

    /// Build a client against a non-default API root (proxies, tests).
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self, DiscordError> {
        let mut authorization = HeaderValue::from_str(&format!("Bot {}", bot_token.trim()))
            .map_err(|_| DiscordError::AuthRequired)?;
        authorization.set_sensitive(true);
        Ok(Self {
            http: reqwest::Client::new(),
            authorization,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
