//! `scribe init` — write a default configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use scribe_core::config::{get_config_path, save_config, Config};

use crate::helpers::expand_tilde;

/// Run the init command. An existing file is left untouched.
pub fn run(config_path: Option<&str>) -> Result<()> {
    let path: PathBuf = config_path.map(expand_tilde).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "📜 Scribe — Setup".cyan().bold());
    println!();

    if path.exists() {
        println!("  {} config already exists at {}", "✓".green(), path.display());
    } else {
        save_config(&Config::default(), Some(path.as_path()))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created config at {}", "✓".green(), path.display());
    }

    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Set discord.token (or DISCORD_BOT_TOKEN)");
    println!("  2. List the channels to watch in discord.channelIds");
    println!("  3. Run {}", "scribe serve".cyan());
    println!();

    Ok(())
}
