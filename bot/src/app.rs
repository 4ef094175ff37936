use std::sync::{Arc, RwLock};

use discord_client::Snowflake;
use echo_db::Database;
use tokio_util::sync::CancellationToken;

use crate::config::BotConfig;
use crate::platform::ChatPlatform;
use crate::reactions::ReactionRouter;

/// Handles every command handler receives. Built once at startup.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Record store
    db: Database,
    /// Chat platform REST operations
    platform: Arc<dyn ChatPlatform>,
    config: BotConfig,
    reactions: ReactionRouter,
    /// Cancelled on process shutdown
    shutdown: CancellationToken,
    /// Our own user id, known after READY
    bot_user_id: RwLock<Option<Snowflake>>,
}

impl SharedState {
    pub fn new(db: Database, platform: Arc<dyn ChatPlatform>, config: BotConfig) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                db,
                platform,
                config,
                reactions: ReactionRouter::new(),
                shutdown: CancellationToken::new(),
                bot_user_id: RwLock::new(None),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn platform(&self) -> &dyn ChatPlatform {
        self.inner.platform.as_ref()
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    pub fn reactions(&self) -> &ReactionRouter {
        &self.inner.reactions
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    pub fn bot_user_id(&self) -> Option<Snowflake> {
        self.inner
            .bot_user_id
            .read()
            .map(|id| *id)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    pub fn set_bot_user_id(&self, id: Snowflake) {
        match self.inner.bot_user_id.write() {
            Ok(mut slot) => *slot = Some(id),
            Err(poisoned) => *poisoned.into_inner() = Some(id),
        }
    }
}
