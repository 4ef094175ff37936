use discord_client::Snowflake;

use super::Invocation;
use super::edit::resolve_channel;
use crate::app::SharedState;
use crate::error::CommandError;

/// Remove the record, then the remote echo.
///
/// The record stays deleted when the remote deletion fails.
pub async fn delete_message(
    state: &SharedState,
    invocation: &Invocation,
    message_id: u64,
) -> Result<(), CommandError> {
    let Some(record) = state.db().find_record(message_id)? else {
        return Err(CommandError::NotFound);
    };

    state.db().delete_record(message_id)?;

    let channel_id = resolve_channel(state, invocation, &record.channel).await?;
    let platform = state.platform();
    let remote = platform
        .fetch_message(channel_id, Snowflake(message_id))
        .await
        .map_err(CommandError::from_remote)?;
    platform
        .delete_message(channel_id, remote.id)
        .await
        .map_err(CommandError::from_remote)?;

    platform
        .send_text(
            invocation.channel_id,
            &format!("Message {message_id} has been deleted!"),
        )
        .await?;
    Ok(())
}
