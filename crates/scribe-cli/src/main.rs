//! Scribe CLI — entry point.
//!
//! # Commands
//!
//! - `scribe serve [--host H] [--port P]` — run the HTTP API
//! - `scribe fetch <CHANNEL_ID> [--limit N]` — print one channel's recent messages
//! - `scribe activity` — print the all-channels activity report
//! - `scribe status` — show configuration status
//! - `scribe init` — write a default config file

mod helpers;
mod init;
mod server;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use scribe_channels::DiscordPlatform;
use scribe_core::config::{load_config, Config};
use scribe_core::{ChannelId, FetchLimit};

use crate::server::AppState;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 📜 Scribe — recent Discord channel history as JSON
#[derive(Parser)]
#[command(name = "scribe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Config file (default: ~/.scribe/config.json)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Fetch recent messages from one channel and print them as JSON
    Fetch {
        /// Numeric channel ID
        channel_id: String,

        /// Number of messages (1-100, anything else falls back to 10)
        #[arg(short, long)]
        limit: Option<String>,

        /// Config file (default: ~/.scribe/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Fetch every configured channel and print the activity report as JSON
    Activity {
        /// Config file (default: ~/.scribe/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show configuration status
    Status {
        /// Config file (default: ~/.scribe/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Write a default config file
    Init {
        /// Config file (default: ~/.scribe/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            logs,
        } => {
            init_logging(logs, "info");
            run_serve(config.as_deref(), host, port).await
        }
        Commands::Fetch {
            channel_id,
            limit,
            config,
        } => {
            init_logging(false, "warn");
            run_fetch(config.as_deref(), &channel_id, limit.as_deref()).await
        }
        Commands::Activity { config } => {
            init_logging(false, "warn");
            run_activity(config.as_deref()).await
        }
        Commands::Status { config } => status::run(config.as_deref()),
        Commands::Init { config } => init::run(config.as_deref()),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_serve(config_path: Option<&str>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load(config_path);
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = build_state(&config)?;
    let addr = config.server.bind_addr();

    helpers::print_banner();
    println!("  Listening on http://{addr}");
    println!("  Channels:   {}", state.channels().len());
    println!();

    info!(
        platform = state.fetcher().platform_name(),
        channels = ?state.channels().iter().map(ChannelId::as_str).collect::<Vec<_>>(),
        "starting API"
    );
    info!("routes: GET /get_recent_messages?channel_id=<id>&limit=<n>, GET /get_recent_activity_from_all_channels, GET /health");

    server::serve(state, &addr).await
}

async fn run_fetch(config_path: Option<&str>, channel_id: &str, limit: Option<&str>) -> Result<()> {
    let channel_id = ChannelId::parse(channel_id)?;
    let limit = FetchLimit::parse(limit)?;

    let config = load(config_path);
    let state = build_state(&config)?;

    match state.fetcher().fetch(&channel_id, limit).await {
        Ok(activity) => {
            helpers::print_json(&activity)?;
            Ok(())
        }
        Err(failure) => {
            helpers::print_json(&failure)?;
            bail!("fetch failed: {}", failure.error_kind)
        }
    }
}

async fn run_activity(config_path: Option<&str>) -> Result<()> {
    let config = load(config_path);
    let state = build_state(&config)?;
    let report = state.activity_report().await;
    helpers::print_json(&report)
}

// ─────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────

fn load(config_path: Option<&str>) -> Config {
    let path: Option<PathBuf> = config_path.map(helpers::expand_tilde);
    load_config(path.as_deref())
}

/// Validate the configuration and build the shared handler state.
fn build_state(config: &Config) -> Result<AppState> {
    let channels = config.validate().context("invalid configuration")?;
    let per_channel_limit = config
        .activity
        .per_channel_limit()
        .context("invalid configuration")?;
    let platform = DiscordPlatform::from_config(&config.discord);

    Ok(AppState::new(Arc::new(platform), channels, per_channel_limit))
}

/// Initialize tracing/logging on stderr so JSON output on stdout stays clean.
///
/// `RUST_LOG` wins over both defaults.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("scribe=debug,info")
        } else {
            EnvFilter::new(default_level)
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
