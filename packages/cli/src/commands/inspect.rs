use super::load_stage;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagebuilder_stage::{NodeId, Stage};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Markup file to inspect
    pub input: PathBuf,

    /// Print each node's field values
    #[arg(short, long)]
    pub data: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = Rc::new(config.registry(cwd)?);
    let stage = load_stage(&args.input, registry)?;

    match args.format.as_str() {
        "json" => {
            let tree = node_json(&stage, stage.root())?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        "text" => print_tree(&stage, args.data)?,
        other => return Err(anyhow!("Unknown format: {}. Use: text or json", other)),
    }

    Ok(())
}

fn print_tree(stage: &Stage, with_data: bool) -> Result<()> {
    for (depth, id) in stage.walk() {
        let node = stage.node(&id)?;
        let indent = "  ".repeat(depth);
        let hidden = node.data_store().get_field("display") == Some(Value::Bool(false));

        print!("{}{} {}", indent, node.name().cyan().bold(), id.to_string().dimmed());
        if hidden {
            print!(" {}", "(hidden)".yellow());
        }
        println!();

        if with_data {
            for (key, value) in node.data_store().get() {
                println!("{}  {} {}", indent, format!("{}:", key).dimmed(), value);
            }
        }
    }
    Ok(())
}

fn node_json(stage: &Stage, id: &NodeId) -> Result<Value> {
    let node = stage.node(id)?;
    let children = node
        .children()
        .iter()
        .map(|child| node_json(stage, child))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "id": id,
        "type": node.name(),
        "data": node.data_store().get(),
        "children": children,
    }))
}
