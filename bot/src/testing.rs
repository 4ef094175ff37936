//! In-memory chat platform and state builders for handler tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use discord_client::{DiscordError, Embed, Message, Snowflake, User};
use echo_db::Database;

use crate::app::SharedState;
use crate::config::BotConfig;
use crate::platform::{ChatPlatform, DIRECT_MESSAGE_CHANNEL};

pub const BOT_ID: Snowflake = Snowflake(9000);

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendText { channel_id: Snowflake, text: String },
    SendEmbed { channel_id: Snowflake, embed: Embed },
    EditEmbed { channel_id: Snowflake, message_id: Snowflake, embed: Embed },
    Delete { channel_id: Snowflake, message_id: Snowflake },
    AddReaction { message_id: Snowflake, emoji: String },
    RemoveReaction { message_id: Snowflake, emoji: String, user_id: Snowflake },
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    next_id: u64,
    /// channel id -> (guild id, name)
    channels: HashMap<Snowflake, (Option<Snowflake>, String)>,
    /// Messages that exist remotely, as (channel, message)
    messages: HashSet<(Snowflake, Snowflake)>,
    fail_remove_reaction: bool,
}

#[derive(Default)]
pub struct FakePlatform {
    inner: Mutex<Inner>,
}

impl FakePlatform {
    pub fn new() -> Self {
        let platform = Self::default();
        platform.lock().next_id = 1000;
        platform
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn add_channel(&self, guild_id: Option<Snowflake>, channel_id: Snowflake, name: &str) {
        self.lock()
            .channels
            .insert(channel_id, (guild_id, name.to_string()));
    }

    /// Make a message fetchable, as if it had been sent earlier.
    pub fn add_message(&self, channel_id: Snowflake, message_id: Snowflake) {
        self.lock().messages.insert((channel_id, message_id));
    }

    pub fn fail_reaction_removal(&self) {
        self.lock().fail_remove_reaction = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn sent_embeds(&self) -> Vec<(Snowflake, Embed)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendEmbed { channel_id, embed } => Some((channel_id, embed)),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<Embed> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::EditEmbed { embed, .. } => Some(embed),
                _ => None,
            })
            .collect()
    }

    fn send(&self, channel_id: Snowflake, call: Call) -> Message {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = Snowflake(inner.next_id);
        inner.messages.insert((channel_id, id));
        inner.calls.push(call);
        message(id, channel_id)
    }
}

fn not_found() -> DiscordError {
    DiscordError::ApiError {
        status: 404,
        message: "Unknown Message".into(),
    }
}

fn message(id: Snowflake, channel_id: Snowflake) -> Message {
    Message {
        id,
        channel_id,
        guild_id: None,
        author: User {
            id: BOT_ID,
            username: "echo".into(),
            global_name: None,
            bot: true,
        },
        content: String::new(),
        embeds: Vec::new(),
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn send_text(&self, channel_id: Snowflake, text: &str) -> Result<Message, DiscordError> {
        Ok(self.send(
            channel_id,
            Call::SendText {
                channel_id,
                text: text.to_string(),
            },
        ))
    }

    async fn send_embed(
        &self,
        channel_id: Snowflake,
        embed: &Embed,
    ) -> Result<Message, DiscordError> {
        Ok(self.send(
            channel_id,
            Call::SendEmbed {
                channel_id,
                embed: embed.clone(),
            },
        ))
    }

    async fn edit_embed(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        embed: &Embed,
    ) -> Result<Message, DiscordError> {
        let mut inner = self.lock();
        if !inner.messages.contains(&(channel_id, message_id)) {
            return Err(not_found());
        }
        inner.calls.push(Call::EditEmbed {
            channel_id,
            message_id,
            embed: embed.clone(),
        });
        Ok(message(message_id, channel_id))
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, DiscordError> {
        if self.lock().messages.contains(&(channel_id, message_id)) {
            Ok(message(message_id, channel_id))
        } else {
            Err(not_found())
        }
    }

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DiscordError> {
        let mut inner = self.lock();
        if !inner.messages.remove(&(channel_id, message_id)) {
            return Err(not_found());
        }
        inner.calls.push(Call::Delete {
            channel_id,
            message_id,
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DiscordError> {
        self.lock().calls.push(Call::AddReaction {
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
        user_id: Snowflake,
    ) -> Result<(), DiscordError> {
        let mut inner = self.lock();
        if inner.fail_remove_reaction {
            return Err(DiscordError::ApiError {
                status: 403,
                message: "Missing Permissions".into(),
            });
        }
        inner.calls.push(Call::RemoveReaction {
            message_id,
            emoji: emoji.to_string(),
            user_id,
        });
        Ok(())
    }

    async fn channel_name(&self, channel_id: Snowflake) -> Result<String, DiscordError> {
        Ok(self
            .lock()
            .channels
            .get(&channel_id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| DIRECT_MESSAGE_CHANNEL.to_string()))
    }

    async fn find_text_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
    ) -> Result<Option<Snowflake>, DiscordError> {
        Ok(self
            .lock()
            .channels
            .iter()
            .find(|(_, (g, n))| *g == Some(guild_id) && n == name)
            .map(|(id, _)| *id))
    }
}

pub fn test_config(timeout: Duration) -> BotConfig {
    BotConfig {
        token: "test-token".into(),
        command_prefix: "_".into(),
        db_path: PathBuf::from(":memory:"),
        pagination_timeout: timeout,
    }
}

/// Fresh in-memory store plus a fake platform.
pub fn test_state() -> (SharedState, Arc<FakePlatform>) {
    test_state_with_timeout(Duration::from_secs(60))
}

pub fn test_state_with_timeout(timeout: Duration) -> (SharedState, Arc<FakePlatform>) {
    let db = Database::open_in_memory().unwrap();
    let platform = Arc::new(FakePlatform::new());
    let state = SharedState::new(db, platform.clone(), test_config(timeout));
    (state, platform)
}
