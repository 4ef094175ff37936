use chrono::Utc;
use discord_client::Snowflake;

use super::Invocation;
use crate::app::SharedState;
use crate::error::CommandError;
use crate::render;

/// Resolve the live channel an echo was recorded in.
pub(super) async fn resolve_channel(
    state: &SharedState,
    invocation: &Invocation,
    channel_name: &str,
) -> Result<Snowflake, CommandError> {
    let Some(guild_id) = invocation.guild_id else {
        return Err(CommandError::ChannelNotFound);
    };
    state
        .platform()
        .find_text_channel(guild_id, channel_name)
        .await?
        .ok_or(CommandError::ChannelNotFound)
}

/// Update the stored content, then the remote echo.
///
/// The store write is not rolled back when the remote update fails.
pub async fn edit_message(
    state: &SharedState,
    invocation: &Invocation,
    message_id: u64,
    new_content: &str,
) -> Result<(), CommandError> {
    let Some(record) = state.db().find_record(message_id)? else {
        return Err(CommandError::NotFound);
    };

    state.db().update_record_content(message_id, new_content)?;

    let channel_id = resolve_channel(state, invocation, &record.channel).await?;
    let platform = state.platform();
    let remote = platform
        .fetch_message(channel_id, Snowflake(message_id))
        .await
        .map_err(CommandError::from_remote)?;

    let embed = render::edited_embed(&invocation.author_name, new_content, record.color, Utc::now());
    platform
        .edit_embed(channel_id, remote.id, &embed)
        .await
        .map_err(CommandError::from_remote)?;

    platform
        .send_text(
            invocation.channel_id,
            &format!("Message {message_id} has been updated!"),
        )
        .await?;
    Ok(())
}
