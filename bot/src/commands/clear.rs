use super::Invocation;
use crate::app::SharedState;
use crate::error::CommandError;

/// Drop every record. Remote echoes are left as they are.
pub async fn clear_history(state: &SharedState, invocation: &Invocation) -> Result<(), CommandError> {
    let removed = state.db().delete_all_records()?;
    tracing::info!(removed, "Message history cleared");
    state
        .platform()
        .send_text(invocation.channel_id, "Message history cleared!")
        .await?;
    Ok(())
}
