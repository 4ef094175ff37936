use super::*;
use crate::models::{Channel, Snowflake};

impl DiscordApiClient {
    /// GET /channels/{channel_id}
    pub async fn get_channel(&self, channel_id: Snowflake) -> Result<Channel, DiscordError> {
        let body = self
            .authenticated_get(&format!("/channels/{channel_id}"))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET /guilds/{guild_id}/channels
    pub async fn get_guild_channels(
        &self,
        guild_id: Snowflake,
    ) -> Result<Vec<Channel>, DiscordError> {
        let body = self
            .authenticated_get(&format!("/guilds/{guild_id}/channels"))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// First text channel of the guild with exactly this name.
    pub async fn find_text_channel_by_name(
        &self,
        guild_id: Snowflake,
        name: &str,
    ) -> Result<Option<Channel>, DiscordError> {
        let channels = self.get_guild_channels(guild_id).await?;
        Ok(select_text_channel(channels, name))
    }
}

pub(super) fn select_text_channel(channels: Vec<Channel>, name: &str) -> Option<Channel> {
    channels
        .into_iter()
        .find(|c| c.is_guild_text() && c.name.as_deref() == Some(name))
}
