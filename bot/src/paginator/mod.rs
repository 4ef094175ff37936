//! Paged history view with reaction-driven navigation.
//!
//! A sent page moves through `Rendered -> AwaitingInput -> Rendered | TimedOut`.
//! While awaiting input only the invoking user's arrow reactions on the paged
//! message are accepted; each accepted reaction re-arms the inactivity timer.
//! The timer is a cancellation token (child of the shutdown token), so
//! process shutdown ends the wait the same way a timeout does.


use std::time::Duration;

use discord_client::models::ReactionAdd;
use discord_client::{Embed, Snowflake};
use echo_db::Database;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::SharedState;
use crate::error::CommandError;
use crate::reactions::ReactionSubscription;
use crate::render;

pub const PAGE_SIZE: u64 = 5;
pub const ARROW_LEFT: &str = "\u{2b05}\u{fe0f}";
pub const ARROW_RIGHT: &str = "\u{27a1}\u{fe0f}";

pub fn total_pages(total_records: u64) -> u64 {
    total_records.div_ceil(PAGE_SIZE)
}

/// Offset/limit slice of records shown on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn for_page(page: u64) -> Self {
        Self {
            offset: page.saturating_sub(1) * PAGE_SIZE,
            limit: PAGE_SIZE,
        }
    }
}

/// Check a requested page against `[1, total_pages]`.
pub fn validate_page(requested: i64, total_pages: u64) -> Result<u64, CommandError> {
    match u64::try_from(requested) {
        Ok(page) if (1..=total_pages).contains(&page) => Ok(page),
        _ => Err(CommandError::InvalidPage { total_pages }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn from_emoji(name: &str) -> Option<Self> {
        match name {
            ARROW_LEFT => Some(Direction::Left),
            ARROW_RIGHT => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Direction::Left => ARROW_LEFT,
            Direction::Right => ARROW_RIGHT,
        }
    }
}

/// Page reached by moving `direction`, or `None` at either edge.
pub fn turn_page(page: u64, total_pages: u64, direction: Direction) -> Option<u64> {
    match direction {
        Direction::Left if page > 1 => Some(page - 1),
        Direction::Right if page < total_pages => Some(page + 1),
        _ => None,
    }
}

/// Fetch the window for `page` and render it.
pub fn render_page(db: &Database, page: u64, total_pages: u64) -> Result<Embed, CommandError> {
    let window = PageWindow::for_page(page);
    let records = db.list_records(window.offset, window.limit)?;
    Ok(render::history_embed(&records, page, total_pages))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    Rendered { page: u64 },
    AwaitingInput { page: u64 },
    TimedOut { page: u64 },
}

/// Inactivity timeout as a cancellation token fired by a sleeper task.
struct InactivityTimer {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl InactivityTimer {
    fn arm(parent: &CancellationToken, after: Duration) -> Self {
        let token = parent.child_token();
        let fire = token.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            fire.cancel();
        });
        Self { token, task }
    }

    async fn expired(&self) {
        self.token.cancelled().await
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One interactive history view, keyed by the paged message id.
pub struct Paginator {
    channel_id: Snowflake,
    message_id: Snowflake,
    user_id: Snowflake,
    total_pages: u64,
    timeout: Duration,
    state: PaginatorState,
}

impl Paginator {
    pub fn new(
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        page: u64,
        total_pages: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            channel_id,
            message_id,
            user_id,
            total_pages,
            timeout,
            state: PaginatorState::Rendered { page },
        }
    }

    pub fn state(&self) -> PaginatorState {
        self.state
    }

    fn accepts(&self, event: &ReactionAdd) -> Option<Direction> {
        if event.message_id != self.message_id || event.user_id != self.user_id {
            return None;
        }
        event.emoji.name.as_deref().and_then(Direction::from_emoji)
    }

    /// Drive the view until it times out. Returns the final state.
    pub async fn run(
        mut self,
        state: &SharedState,
        mut reactions: ReactionSubscription,
    ) -> Result<PaginatorState, CommandError> {
        loop {
            match self.state {
                PaginatorState::Rendered { page } => {
                    self.state = PaginatorState::AwaitingInput { page };
                }
                PaginatorState::AwaitingInput { page } => {
                    let timer = InactivityTimer::arm(state.shutdown_token(), self.timeout);
                    let accepted = loop {
                        tokio::select! {
                            _ = timer.expired() => break None,
                            event = reactions.recv() => {
                                let Some(event) = event else { break None };
                                if let Some(direction) = self.accepts(&event) {
                                    break Some((direction, event.user_id));
                                }
                            }
                        }
                    };
                    drop(timer);

                    let Some((direction, user_id)) = accepted else {
                        if state.shutdown_token().is_cancelled() {
                            tracing::debug!(message_id = %self.message_id, "Pagination stopped by shutdown");
                        } else {
                            tracing::debug!(message_id = %self.message_id, page, "Pagination timed out");
                        }
                        self.state = PaginatorState::TimedOut { page };
                        continue;
                    };

                    let Some(next) = turn_page(page, self.total_pages, direction) else {
                        tracing::trace!(page, ?direction, "Page turn at edge ignored");
                        continue;
                    };

                    let embed = render_page(state.db(), next, self.total_pages)?;
                    state
                        .platform()
                        .edit_embed(self.channel_id, self.message_id, &embed)
                        .await?;
                    if let Err(e) = state
                        .platform()
                        .remove_reaction(self.channel_id, self.message_id, direction.emoji(), user_id)
                        .await
                    {
                        tracing::warn!(message_id = %self.message_id, "Failed to remove page reaction: {e}");
                    }
                    self.state = PaginatorState::Rendered { page: next };
                }
                PaginatorState::TimedOut { .. } => return Ok(self.state),
            }
        }
    }
}
