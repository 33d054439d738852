//! Config loader — reads `~/.scribe/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.scribe/config.json` (or the path given)
//! 3. `.env` in the working directory (never overrides real env vars)
//! 4. Environment variables `SCRIBE_<SECTION>__<FIELD>`, plus the legacy
//!    `DISCORD_BOT_TOKEN` / `PORT` names
//!
//! Loading is lenient: a missing or broken file falls back to defaults with a
//! warning. Use [`Config::validate`] to enforce what the server needs.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default (or given) path + `.env` + env vars.
pub fn load_config(path: Option<&Path>) -> Config {
    if let Ok(env_path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", env_path.display());
    }

    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SCRIBE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `SCRIBE_DISCORD__TOKEN` → `discord.token` (legacy: `DISCORD_BOT_TOKEN`)
/// - `SCRIBE_DISCORD__API_BASE` → `discord.api_base`
/// - `SCRIBE_DISCORD__CHANNEL_IDS` → `discord.channel_ids` (comma separated)
/// - `SCRIBE_SERVER__HOST` → `server.host`
/// - `SCRIBE_SERVER__PORT` → `server.port` (legacy: `PORT`)
/// - `SCRIBE_ACTIVITY__PER_CHANNEL_LIMIT` → `activity.per_channel_limit`
///
/// The prefixed name wins when both it and the legacy name are set.
fn apply_env_overrides(mut config: Config) -> Config {
    // Discord
    if let Some(val) = env_var_any(&["SCRIBE_DISCORD__TOKEN", "DISCORD_BOT_TOKEN"]) {
        config.discord.token = val;
    }
    if let Ok(val) = std::env::var("SCRIBE_DISCORD__API_BASE") {
        config.discord.api_base = val;
    }
    if let Ok(val) = std::env::var("SCRIBE_DISCORD__CHANNEL_IDS") {
        config.discord.channel_ids = split_list(&val);
    }

    // Server
    if let Ok(val) = std::env::var("SCRIBE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(val) = env_var_any(&["SCRIBE_SERVER__PORT", "PORT"]) {
        match val.parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => warn!("Ignoring invalid port from environment: {}", val),
        }
    }

    // Activity
    if let Ok(val) = std::env::var("SCRIBE_ACTIVITY__PER_CHANNEL_LIMIT") {
        match val.parse::<i64>() {
            Ok(n) => config.activity.per_channel_limit = n,
            Err(_) => warn!("Ignoring invalid per-channel limit from environment: {}", val),
        }
    }

    config
}

/// First set variable among `names`.
fn env_var_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
