use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Base URL for media directives
    #[arg(short, long)]
    pub media_url: Option<String>,

    /// Write compact markup by default
    #[arg(long)]
    pub compact: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut config = Config::default();
    if let Some(media_url) = args.media_url {
        config.media_url = media_url;
    }
    config.pretty = !args.compact;

    fs::write(&config_path, serde_json::to_string_pretty(&config)? + "\n")?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!("     mediaUrl: {}", config.media_url.bright_white());

    Ok(())
}
