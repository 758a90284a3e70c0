use super::find_markup_files;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagebuilder_markup::{format_error, parse, Element};
use pagebuilder_stage::{render, Registry, ROOT_CONTENT_TYPE};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Markup file or directory of .html files
    pub input: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

/// Something `render::load` would silently skip or repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub content_type: String,
    pub message: String,
}

impl Diagnostic {
    fn new(level: Level, content_type: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            content_type: content_type.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate(args: ValidateArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry(cwd)?;

    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_markup_files(&args.input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    };

    let mut errors = 0;
    let mut warnings = 0;
    for file in &files {
        let source = fs::read_to_string(file)?;
        let fragment = match parse(&source) {
            Ok(fragment) => fragment,
            Err(err) => {
                eprintln!("{}", format_error(&source, &file.display().to_string(), &err));
                errors += 1;
                continue;
            }
        };

        let diagnostics = check_elements(&registry, ROOT_CONTENT_TYPE, &fragment.content_types());
        errors += diagnostics.iter().filter(|d| d.level == Level::Error).count();
        warnings += diagnostics.iter().filter(|d| d.level == Level::Warning).count();
        report(file, &diagnostics, &args.format)?;
    }

    println!();
    println!("   Files checked: {}", files.len());
    if errors > 0 {
        println!("   {} {}", "Errors:".red(), errors);
    }
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }

    if errors > 0 || (args.strict && warnings > 0) {
        return Err(anyhow!("validation failed"));
    }
    if warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }
    Ok(())
}

fn report(file: &Path, diagnostics: &[Diagnostic], format: &str) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(diagnostics)?);
        return Ok(());
    }

    println!("{}", file.display());
    for diagnostic in diagnostics {
        let level = match diagnostic.level {
            Level::Error => "error".red().bold(),
            Level::Warning => "warning".yellow().bold(),
        };
        println!("  {} [{}] {}", level, diagnostic.content_type, diagnostic.message);
    }
    Ok(())
}

/// Check content-type wrappers found directly inside a `parent` node
pub fn check_elements(registry: &Registry, parent: &str, elements: &[&Element]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let parent_config = registry.get(parent).map(|definition| definition.config.clone());

    for element in elements {
        let name = element.content_type().unwrap_or_default();
        let Some(definition) = registry.get(name) else {
            diagnostics.push(Diagnostic::new(Level::Error, name, "unknown content type"));
            continue;
        };
        if let Some(parent_config) = &parent_config {
            if !parent_config.allows_child(name) {
                diagnostics.push(Diagnostic::new(
                    Level::Warning,
                    name,
                    format!("not allowed inside {}", parent),
                ));
                continue;
            }
        }

        for field in &definition.config.fields {
            let Some(binding) = &field.binding else {
                continue;
            };
            let Some(raw) = render::read_field(element, binding) else {
                continue;
            };
            if let Err(err) = definition.converter(&field.name).from_dom(&raw) {
                diagnostics.push(Diagnostic::new(
                    Level::Warning,
                    name,
                    format!("field {}: {}", field.name, err),
                ));
            }
        }

        let nested = element.content_type_children();
        if definition.config.is_collection() {
            diagnostics.extend(check_elements(registry, name, &nested));
        } else if !nested.is_empty() {
            diagnostics.push(Diagnostic::new(
                Level::Warning,
                name,
                format!("{} nested content types ignored", nested.len()),
            ));
        }
    }

    diagnostics
}
