use serde::Serialize;

use super::*;
use crate::models::{Embed, Message, Snowflake};

/// Body for create/edit message requests.
#[derive(Debug, Default, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
}

impl MessagePayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: None,
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: Some(vec![embed]),
        }
    }
}

impl DiscordApiClient {
    /// POST /channels/{channel_id}/messages
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        let body = self
            .authenticated_post(&format!("/channels/{channel_id}/messages"), payload)
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// PATCH /channels/{channel_id}/messages/{message_id}
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        let body = self
            .authenticated_patch(
                &format!("/channels/{channel_id}/messages/{message_id}"),
                payload,
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET /channels/{channel_id}/messages/{message_id}
    pub async fn get_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, DiscordError> {
        let body = self
            .authenticated_get(&format!("/channels/{channel_id}/messages/{message_id}"))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// DELETE /channels/{channel_id}/messages/{message_id}
    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DiscordError> {
        self.authenticated_delete(&format!("/channels/{channel_id}/messages/{message_id}"))
            .await
    }
}
