use chrono::Utc;
use echo_db::MessageRecord;

use super::Invocation;
use crate::app::SharedState;
use crate::error::CommandError;
use crate::render;

/// Send `text` as an echo embed, then record it.
///
/// The record is written only after the send succeeds. A failed write
/// leaves the sent echo without a record.
pub async fn repeat(
    state: &SharedState,
    invocation: &Invocation,
    text: &str,
) -> Result<(), CommandError> {
    let platform = state.platform();
    let channel = platform.channel_name(invocation.channel_id).await?;
    let color = render::pick_color();
    let now = Utc::now();

    let embed = render::echo_embed(&invocation.author_name, text, color, now);
    let sent = platform.send_embed(invocation.channel_id, &embed).await?;

    let record = MessageRecord {
        message_id: sent.id.get(),
        author: invocation.author_name.clone(),
        content: text.to_string(),
        color,
        channel,
        created_at: now.timestamp(),
    };
    if let Err(e) = state.db().insert_record(&record) {
        tracing::warn!(message_id = %sent.id, "Echo sent but not recorded");
        return Err(e.into());
    }

    tracing::info!(message_id = %sent.id, channel = %record.channel, "Echo recorded");
    Ok(())
}
