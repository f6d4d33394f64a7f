mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, fetch, render, ApplyArgs, FetchArgs, RenderArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dossier CLI - inspect and edit interactive report documents
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./dossier.config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the block tree of a report
    Render(RenderArgs),

    /// Splice a fragment into a report, or submit one of its Interactive regions
    Apply(ApplyArgs),

    /// Fetch the payload behind an asset block
    Fetch(FetchArgs),
}

fn init_tracing(verbose: bool, config: &Config) {
    let default = if verbose {
        "debug"
    } else {
        config.log.as_deref().unwrap_or("info")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd, cli.config.as_deref())?;
    init_tracing(cli.verbose, &config);

    match cli.command {
        Command::Render(args) => render(args, &config),
        Command::Apply(args) => apply(args, &config),
        Command::Fetch(args) => fetch(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
