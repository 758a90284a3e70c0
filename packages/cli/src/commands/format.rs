use super::load_stage;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagebuilder_stage::render;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Markup file to rewrite
    pub input: PathBuf,

    /// Write compact markup regardless of config
    #[arg(short, long)]
    pub compact: bool,

    /// Overwrite the input instead of printing to stdout
    #[arg(short, long)]
    pub write: bool,
}

/// Read a page and write it back in canonical form
pub fn format(args: FormatArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = Rc::new(config.registry(cwd)?);
    let stage = load_stage(&args.input, registry)?;

    let output = render::write_stage(&stage, &config.serialize_options(args.compact))?;

    if args.write {
        fs::write(&args.input, output + "\n")?;
        eprintln!(
            "  {} {} ({} content types)",
            "✓".green(),
            args.input.display(),
            stage.len() - 1
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
