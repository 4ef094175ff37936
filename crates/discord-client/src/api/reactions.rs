use super::*;
use crate::models::Snowflake;

impl DiscordApiClient {
    /// Add a reaction as the bot user.
    pub async fn create_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DiscordError> {
        let emoji = encode_emoji(emoji);
        self.authenticated_put_no_body(&format!(
            "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me"
        ))
        .await
    }

    /// Remove another user's reaction. Needs MANAGE_MESSAGES in guilds.
    pub async fn delete_user_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
        user_id: Snowflake,
    ) -> Result<(), DiscordError> {
        let emoji = encode_emoji(emoji);
        self.authenticated_delete(&format!(
            "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/{user_id}"
        ))
        .await
    }
}

/// Percent-encode a unicode emoji for use as a path segment.
pub(super) fn encode_emoji(emoji: &str) -> String {
    url::form_urlencoded::byte_serialize(emoji.as_bytes()).collect()
}
