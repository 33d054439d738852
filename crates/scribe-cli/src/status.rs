//! `scribe status` — show configuration status.
//!
//! Reports the config path, the masked bot token, the listener address, and
//! each configured channel ID with whether it parses.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use scribe_core::config::{get_config_path, load_config};
use scribe_core::utils::mask_secret;
use scribe_core::ChannelId;

use crate::helpers::expand_tilde;

/// Run the status command.
pub fn run(config_path: Option<&str>) -> Result<()> {
    let path: PathBuf = config_path.map(expand_tilde).unwrap_or_else(get_config_path);
    let config = load_config(Some(path.as_path()));

    println!();
    println!("{}", "📜 Scribe Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    let token = if config.discord.is_configured() {
        format!("{} {}", "✓".green(), mask_secret(&config.discord.token).dimmed())
    } else {
        format!("{}", "✗ not set".red())
    };
    println!("  {:<18} {}", "Bot token:".bold(), token);
    println!("  {:<18} {}", "API base:".bold(), config.discord.api_base);
    println!("  {:<18} {}", "Listen:".bold(), config.server.bind_addr());
    println!(
        "  {:<18} {}",
        "Per-channel limit:".bold(),
        config.activity.per_channel_limit
    );

    println!();
    println!("  {}", "Channels:".bold());
    if config.discord.channel_ids.is_empty() {
        println!("    {}", "· none configured".dimmed());
    }
    for raw in &config.discord.channel_ids {
        let mark = if ChannelId::parse(raw).is_ok() {
            "✓".green()
        } else {
            "✗ not a numeric ID".red()
        };
        println!("    {:<22} {}", raw, mark);
    }

    println!();
    match config.validate() {
        Ok(channels) => println!(
            "  {} ready to serve {} channel(s)",
            "✓".green(),
            channels.len()
        ),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }
    println!();

    Ok(())
}
