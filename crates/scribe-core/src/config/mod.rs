//! Configuration system — schema, loading, env var overrides and validation.
//!
//! # Usage
//! ```no_run
//! use scribe_core::config;
//!
//! let cfg = config::load_config(None);
//! let channels = cfg.validate().expect("invalid configuration");
//! println!("Watching {} channels", channels.len());
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{
    ActivityConfig, Config, ConfigError, DiscordConfig, ServerConfig, DEFAULT_DISCORD_API_BASE,
};
