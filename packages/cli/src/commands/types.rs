use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Print full definitions as JSON
    #[arg(long)]
    pub json: bool,
}

/// List registered content types
pub fn types(args: TypesArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry(cwd)?;

    if args.json {
        let configs: Vec<_> = registry
            .names()
            .into_iter()
            .filter_map(|name| registry.get(name))
            .map(|definition| definition.config.clone())
            .collect();
        println!("{}", serde_json::to_string_pretty(&configs)?);
        return Ok(());
    }

    for name in registry.names() {
        let Some(definition) = registry.get(name) else {
            continue;
        };
        let config = &definition.config;
        println!(
            "{} {} {}",
            name.cyan().bold(),
            config.label.dimmed(),
            format!("({} fields)", config.fields.len()).dimmed()
        );
        if config.is_collection() {
            let allowed = if config.allowed_children.is_empty() {
                "any".to_string()
            } else {
                config.allowed_children.join(", ")
            };
            println!("    children: {}", allowed);
        }
    }

    Ok(())
}
