//! Configuration schema.
//!
//! Hierarchy: `Config` → `DiscordConfig`, `ServerConfig`, `ActivityConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChannelId, FetchLimit};

/// Discord REST API base URL.
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.scribe/config.json` + env vars.
///
/// Built once at startup. After [`Config::validate`] succeeds it is treated as
/// immutable and handed to the fetcher and the HTTP layer explicitly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub discord: DiscordConfig,
    pub server: ServerConfig,
    pub activity: ActivityConfig,
}

/// Startup validation failure. The process must not serve requests with these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("discord bot token is not set (config discord.token or DISCORD_BOT_TOKEN)")]
    MissingToken,
    #[error("no target channel IDs configured (config discord.channelIds)")]
    NoChannels,
    #[error("invalid channel ID '{0}' in discord.channelIds: all IDs must be strings of digits")]
    InvalidChannelId(String),
    #[error("activity.perChannelLimit must be between 1 and 100, got {0}")]
    InvalidPerChannelLimit(i64),
}

impl Config {
    /// Check everything the server needs and return the parsed channel list.
    pub fn validate(&self) -> Result<Vec<ChannelId>, ConfigError> {
        if !self.discord.is_configured() {
            return Err(ConfigError::MissingToken);
        }
        self.activity.per_channel_limit()?;
        self.discord.target_channels()
    }
}

// ─────────────────────────────────────────────
// Discord
// ─────────────────────────────────────────────

/// Discord bot credential and the channels the activity report covers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    #[serde(default)]
    pub token: String,
    /// REST API base URL.
    pub api_base: String,
    /// Ordered list of channel IDs for the all-channels report.
    #[serde(default)]
    pub channel_ids: Vec<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_DISCORD_API_BASE.to_string(),
            channel_ids: Vec::new(),
        }
    }
}

impl DiscordConfig {
    /// Whether a bot token is present.
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Parse `channel_ids`, rejecting an empty list or any non-digit entry.
    pub fn target_channels(&self) -> Result<Vec<ChannelId>, ConfigError> {
        if self.channel_ids.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        self.channel_ids
            .iter()
            .map(|raw| {
                ChannelId::parse(raw).map_err(|_| ConfigError::InvalidChannelId(raw.clone()))
            })
            .collect()
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────
// Activity
// ─────────────────────────────────────────────

/// Settings for the all-channels activity report.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityConfig {
    /// Messages fetched from each configured channel.
    pub per_channel_limit: i64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            per_channel_limit: i64::from(FetchLimit::ALL_CHANNELS.get()),
        }
    }
}

impl ActivityConfig {
    pub fn per_channel_limit(&self) -> Result<FetchLimit, ConfigError> {
        FetchLimit::checked(self.per_channel_limit)
            .ok_or(ConfigError::InvalidPerChannelLimit(self.per_channel_limit))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
