use super::Invocation;
use crate::app::SharedState;
use crate::error::CommandError;
use crate::paginator::{self, ARROW_LEFT, ARROW_RIGHT, Paginator};

/// Send the requested history page and, when there is more than one
/// page, let the invoking user flip through it with reactions.
pub async fn history(
    state: &SharedState,
    invocation: &Invocation,
    requested_page: i64,
) -> Result<(), CommandError> {
    let total = state.db().count_records()?;
    let total_pages = paginator::total_pages(total);
    let page = paginator::validate_page(requested_page, total_pages)?;

    let embed = paginator::render_page(state.db(), page, total_pages)?;
    let platform = state.platform();
    let sent = platform.send_embed(invocation.channel_id, &embed).await?;

    if total_pages <= 1 {
        return Ok(());
    }

    let subscription = state.reactions().subscribe(sent.id);
    platform
        .add_reaction(sent.channel_id, sent.id, ARROW_LEFT)
        .await?;
    platform
        .add_reaction(sent.channel_id, sent.id, ARROW_RIGHT)
        .await?;

    let view = Paginator::new(
        sent.channel_id,
        sent.id,
        invocation.user_id,
        page,
        total_pages,
        state.config().pagination_timeout,
    );
    let outcome = view.run(state, subscription).await?;
    tracing::debug!(message_id = %sent.id, ?outcome, "History view closed");
    Ok(())
}
