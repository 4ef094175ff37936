//! Command failures and their user-visible replies.

use discord_client::DiscordError;
use echo_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("record not found")]
    NotFound,

    #[error("stored channel no longer resolves")]
    ChannelNotFound,

    #[error("remote message no longer exists")]
    RemoteMessageNotFound,

    #[error("page out of range (total pages: {total_pages})")]
    InvalidPage { total_pages: u64 },

    #[error("bad arguments: {0}")]
    Usage(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("platform error: {0}")]
    Platform(#[from] DiscordError),
}

impl CommandError {
    /// Reply text for failures reported back to the invoking channel.
    /// Internal failures return `None` and are only logged.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CommandError::NotFound => Some("Message not found!".into()),
            CommandError::ChannelNotFound => Some("Channel not found!".into()),
            CommandError::RemoteMessageNotFound => {
                Some("Could not find the original message in the channel.".into())
            }
            CommandError::InvalidPage { total_pages } => Some(format!(
                "Invalid page number! There are {total_pages} pages available."
            )),
            CommandError::Usage(usage) => Some(usage.clone()),
            CommandError::UnknownCommand(_)
            | CommandError::Store(_)
            | CommandError::Platform(_) => None,
        }
    }

    /// Map a platform 404 on the echoed message to `RemoteMessageNotFound`.
    pub fn from_remote(err: DiscordError) -> Self {
        if err.is_not_found() {
            CommandError::RemoteMessageNotFound
        } else {
            CommandError::Platform(err)
        }
    }
}
