//! Prefix command parsing and execution.

mod clear;
mod delete;
mod echo;
mod edit;
mod history;
#[cfg(test)]
mod tests;

pub use clear::clear_history;
pub use delete::delete_message;
pub use echo::repeat;
pub use edit::edit_message;
pub use history::history;

use std::num::IntErrorKind;

use discord_client::{Message, Snowflake};

use crate::app::SharedState;
use crate::error::CommandError;

/// Who invoked a command, and where.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub user_id: Snowflake,
    pub author_name: String,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

impl Invocation {
    pub fn from_message(message: &Message) -> Self {
        Self {
            user_id: message.author.id,
            author_name: message.author.username.clone(),
            channel_id: message.channel_id,
            guild_id: message.guild_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Repeat { message: String },
    History { page: i64 },
    EditMessage { message_id: u64, new_content: String },
    ClearHistory,
    DeleteMessage { message_id: u64 },
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Repeat { .. } => "repeat",
            Command::History { .. } => "history",
            Command::EditMessage { .. } => "edit_message",
            Command::ClearHistory => "clear_history",
            Command::DeleteMessage { .. } => "delete_message",
            Command::Help => "help",
        }
    }
}

const COMMANDS: &[(&str, &str, &str)] = &[
    ("repeat", "<message>", "Echo a message and record it"),
    ("history", "[page]", "Browse recorded messages"),
    (
        "edit_message",
        "<message_id> <new_content>",
        "Edit a recorded echo",
    ),
    ("delete_message", "<message_id>", "Delete a recorded echo"),
    ("clear_history", "", "Forget every recorded message"),
    ("help", "", "Show this list"),
];

fn usage(prefix: &str, name: &str) -> CommandError {
    let args = COMMANDS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, args, _)| *args)
        .unwrap_or_default();
    let line = if args.is_empty() {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}{name} {args}")
    };
    CommandError::Usage(format!("Usage: `{line}`"))
}

pub fn help_text(prefix: &str) -> String {
    let mut out = String::from("Commands:");
    for (name, args, about) in COMMANDS {
        let line = if args.is_empty() {
            format!("{prefix}{name}")
        } else {
            format!("{prefix}{name} {args}")
        };
        out.push_str(&format!("\n`{line}` - {about}"));
    }
    out
}

/// Split off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Integer argument; out-of-range numbers clamp so they fail range checks
/// later instead of being reported as malformed.
fn page_arg(arg: &str) -> Option<i64> {
    match arg.parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn message_id_arg(arg: &str) -> Option<u64> {
    match arg.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

/// Parse a message body. `None` means it is not addressed to the bot.
pub fn parse(content: &str, prefix: &str) -> Option<Result<Command, CommandError>> {
    let body = content.strip_prefix(prefix)?;
    let (name, rest) = split_word(body);
    if name.is_empty() {
        return None;
    }
    let rest = rest.trim();

    let parsed = match name {
        "repeat" => {
            if rest.is_empty() {
                Err(usage(prefix, name))
            } else {
                Ok(Command::Repeat {
                    message: rest.to_string(),
                })
            }
        }
        "history" => {
            let (arg, _) = split_word(rest);
            if arg.is_empty() {
                Ok(Command::History { page: 1 })
            } else {
                page_arg(arg)
                    .map(|page| Command::History { page })
                    .ok_or_else(|| usage(prefix, name))
            }
        }
        "edit_message" => {
            let (id, new_content) = split_word(rest);
            match message_id_arg(id) {
                Some(message_id) if !new_content.is_empty() => Ok(Command::EditMessage {
                    message_id,
                    new_content: new_content.to_string(),
                }),
                _ => Err(usage(prefix, name)),
            }
        }
        "delete_message" => {
            let (id, _) = split_word(rest);
            message_id_arg(id)
                .map(|message_id| Command::DeleteMessage { message_id })
                .ok_or_else(|| usage(prefix, name))
        }
        "clear_history" => Ok(Command::ClearHistory),
        "help" => Ok(Command::Help),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    };
    Some(parsed)
}

/// Run a parsed command to completion.
pub async fn execute(
    state: &SharedState,
    invocation: &Invocation,
    command: Command,
) -> Result<(), CommandError> {
    match command {
        Command::Repeat { message } => repeat(state, invocation, &message).await,
        Command::History { page } => history(state, invocation, page).await,
        Command::EditMessage {
            message_id,
            new_content,
        } => edit_message(state, invocation, message_id, &new_content).await,
        Command::ClearHistory => clear_history(state, invocation).await,
        Command::DeleteMessage { message_id } => {
            delete_message(state, invocation, message_id).await
        }
        Command::Help => {
            let text = help_text(&state.config().command_prefix);
            state
                .platform()
                .send_text(invocation.channel_id, &text)
                .await?;
            Ok(())
        }
    }
}

/// Report a failure: user-visible ones as a reply, the rest to the log.
pub async fn report_failure(
    state: &SharedState,
    invocation: &Invocation,
    command: &str,
    error: CommandError,
) {
    match error.user_message() {
        Some(text) => {
            if let Err(e) = state.platform().send_text(invocation.channel_id, &text).await {
                tracing::warn!(command, "Failed to send error reply: {e}");
            }
        }
        None => {
            tracing::error!(command, user_id = %invocation.user_id, "Command failed: {error}");
        }
    }
}
