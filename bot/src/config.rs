//! Runtime configuration loaded from the environment (after `.env`).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PREFIX: &str = "_";
const DEFAULT_PAGINATION_TIMEOUT_SECS: u64 = 60;
const DB_FILE_NAME: &str = "messages.db";

/// Bot configuration. The token is masked in `Debug` output.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub command_prefix: String,
    pub db_path: PathBuf,
    pub pagination_timeout: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"***")
            .field("command_prefix", &self.command_prefix)
            .field("db_path", &self.db_path)
            .field("pagination_timeout", &self.pagination_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String { get(key).map(|v| v.trim().to_string()).unwrap_or_default() };

        let token = g("DISCORD_TOKEN");
        if token.is_empty() {
            anyhow::bail!("DISCORD_TOKEN is not set");
        }

        let command_prefix = {
            let p = g("COMMAND_PREFIX");
            if p.is_empty() { DEFAULT_PREFIX.into() } else { p }
        };

        let db_path = {
            let explicit = g("ECHO_BOT_DB_PATH");
            if explicit.is_empty() {
                data_dir(&g("ECHO_BOT_DATA_DIR")).join(DB_FILE_NAME)
            } else {
                PathBuf::from(explicit)
            }
        };

        let timeout_secs = parse_u64(
            "PAGINATION_TIMEOUT_SECS",
            &g("PAGINATION_TIMEOUT_SECS"),
            DEFAULT_PAGINATION_TIMEOUT_SECS,
        );

        Ok(Self {
            token,
            command_prefix,
            db_path,
            pagination_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Data directory. Priority: ECHO_BOT_DATA_DIR > ~/.echo-bot
fn data_dir(configured: &str) -> PathBuf {
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".echo-bot")
}

fn parse_u64(key: &str, s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    match s.parse::<u64>() {
        Ok(v) if v > 0 => v,
        _ => {
            tracing::warn!(key, value = s, default, "Invalid numeric setting, using default");
            default
        }
    }
}
