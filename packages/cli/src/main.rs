mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    format, init, inspect, types, validate, FormatArgs, InitArgs, InspectArgs, TypesArgs,
    ValidateArgs,
};
use tracing_subscriber::EnvFilter;

/// PageBuilder CLI - read, check and rewrite stored page markup
#[derive(Parser, Debug)]
#[command(name = "pagebuilder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log stage activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a pagebuilder.config.json
    Init(InitArgs),

    /// Print the content tree stored in a page
    Inspect(InspectArgs),

    /// Read a page and write it back in canonical form
    Format(FormatArgs),

    /// Report content that would be skipped or repaired on load
    Validate(ValidateArgs),

    /// List registered content types
    Types(TypesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Format(args) => format(args, &cwd),
        Command::Validate(args) => validate(args, &cwd),
        Command::Types(args) => types(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
