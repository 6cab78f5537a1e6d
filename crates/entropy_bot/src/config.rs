//! Environment bootstrap.
//!
//! Only process-level settings live in the environment (token, guild, admin
//! list, directories); platform ids and schedules come from the
//! `bot_constants` table at call sites.

use entropy_error::{ConfigError, ConfigErrorKind};
use serenity::all::{GuildId, UserId};
use std::path::PathBuf;

/// Process configuration read once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token (prod or dev, selected by `IS_PROD`)
    pub token: String,
    /// Whether prod constant values are in effect
    pub is_prod: bool,
    /// The guild this bot manages
    pub guild_id: GuildId,
    /// Admins receiving diagnostic DMs
    pub admin_ids: Vec<UserId>,
    /// Directory transcripts and attachments are written under
    pub transcript_dir: PathBuf,
    /// Directory per-day admin logs are written under
    pub log_dir: PathBuf,
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .map_err(|_| ConfigError::new(ConfigErrorKind::MissingEnv(name.to_string())))
}

/// Parse the comma-separated `ADMIN_IDS` value.
pub fn parse_admin_ids(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<u64>().ok())
        .map(UserId::new)
        .collect()
}

impl BotConfig {
    /// Assemble the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let is_prod = matches!(
            std::env::var("IS_PROD").as_deref(),
            Ok("true") | Ok("1")
        );

        let token = if is_prod {
            require("DISCORD_BOT_TOKEN_PROD")?
        } else {
            require("DISCORD_BOT_TOKEN_DEV")?
        };

        let guild_raw = require("GUILD_ID")?;
        let guild_id = guild_raw.parse::<u64>().map(GuildId::new).map_err(|_| {
            ConfigError::new(ConfigErrorKind::InvalidValue {
                key: "GUILD_ID".to_string(),
                value: guild_raw,
            })
        })?;

        let admin_ids = parse_admin_ids(&std::env::var("ADMIN_IDS").unwrap_or_default());

        let transcript_dir = std::env::var("TRANSCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./transcripts"));
        let log_dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));

        Ok(Self {
            token,
            is_prod,
            guild_id,
            admin_ids,
            transcript_dir,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_ids_parse_with_whitespace_and_gaps() {
        let ids = parse_admin_ids("123, 456 ,,789");
        assert_eq!(
            ids,
            vec![UserId::new(123), UserId::new(456), UserId::new(789)]
        );
    }

    #[test]
    fn garbage_admin_entries_are_dropped() {
        let ids = parse_admin_ids("abc,123");
        assert_eq!(ids, vec![UserId::new(123)]);
    }

    #[test]
    fn empty_admin_list_is_fine() {
        assert!(parse_admin_ids("").is_empty());
    }
}
