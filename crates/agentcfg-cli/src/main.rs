//! agentcfg CLI
//!
//! Resolves and validates agent, model and tool configuration from the
//! command line.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose)?;

    let global = &cli.global;
    match cli.command {
        Commands::Check { path } => commands::run_check(&path, global),
        Commands::List { path, kind } => commands::run_list(&path, kind, global),
        Commands::Show {
            path,
            kind,
            name,
            json,
        } => commands::run_show(&path, kind, &name, json, global),
        Commands::Env { path } => commands::run_env(&path, global),
        Commands::Init {
            path,
            format,
            force,
        } => commands::run_init(&path, format, force),
    }
}

/// Log to stderr: DEBUG when verbose, otherwise `RUST_LOG` (default warn).
fn init_tracing(verbose: bool) -> Result<()> {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}
