//! The chat-platform operations handlers depend on.
//!
//! Handlers talk to `dyn ChatPlatform` so the REST client can be swapped
//! for an in-memory fake in tests.

use async_trait::async_trait;
use discord_client::api::{DiscordApiClient, MessagePayload};
use discord_client::{DiscordError, Embed, Message, Snowflake};

/// Name recorded for channels that have none (direct messages).
pub const DIRECT_MESSAGE_CHANNEL: &str = "direct-message";

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_text(&self, channel_id: Snowflake, text: &str) -> Result<Message, DiscordError>;

    async fn send_embed(&self, channel_id: Snowflake, embed: &Embed)
    -> Result<Message, DiscordError>;

    async fn edit_embed(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        embed: &Embed,
    ) -> Result<Message, DiscordError>;

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, DiscordError>;

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DiscordError>;

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DiscordError>;

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
        user_id: Snowflake,
    ) -> Result<(), DiscordError>;

    /// Current name of a channel.
    async fn channel_name(&self, channel_id: Snowflake) -> Result<String, DiscordError>;

    /// Text channel of the guild with exactly this name.
    async fn find_text_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
    ) -> Result<Option<Snowflake>, DiscordError>;
}

#[async_trait]
impl ChatPlatform for DiscordApiClient {
    async fn send_text(&self, channel_id: Snowflake, text: &str) -> Result<Message, DiscordError> {
        self.create_message(channel_id, &MessagePayload::text(text))
            .await
    }

    async fn send_embed(
        &self,
        channel_id: Snowflake,
        embed: &Embed,
    ) -> Result<Message, DiscordError> {
        self.create_message(channel_id, &MessagePayload::embed(embed.clone()))
            .await
    }

    async fn edit_embed(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        embed: &Embed,
    ) -> Result<Message, DiscordError> {
        self.edit_message(channel_id, message_id, &MessagePayload::embed(embed.clone()))
            .await
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, DiscordError> {
        self.get_message(channel_id, message_id).await
    }

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DiscordError> {
        DiscordApiClient::delete_message(self, channel_id, message_id).await
    }

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DiscordError> {
        self.create_reaction(channel_id, message_id, emoji).await
    }

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
        user_id: Snowflake,
    ) -> Result<(), DiscordError> {
        self.delete_user_reaction(channel_id, message_id, emoji, user_id)
            .await
    }

    async fn channel_name(&self, channel_id: Snowflake) -> Result<String, DiscordError> {
        let channel = self.get_channel(channel_id).await?;
        Ok(channel
            .name
            .unwrap_or_else(|| DIRECT_MESSAGE_CHANNEL.to_string()))
    }

    async fn find_text_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
    ) -> Result<Option<Snowflake>, DiscordError> {
        Ok(self
            .find_text_channel_by_name(guild_id, name)
            .await?
            .map(|c| c.id))
    }
}
