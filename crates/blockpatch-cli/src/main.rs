//! blockpatch CLI
//!
//! Maintains a marked region inside a config file, regenerates GoAccess
//! referrer-ignore rules and drives certbot from a domain list.

mod cli;
mod commands;
mod error;
mod logging;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;

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

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "blockpatch", &mut io::stdout());
        return Ok(());
    }

    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Some(cmd) => {
            if !cli.patch.is_empty() {
                return Err(CliError::user(
                    "patch options cannot be combined with a subcommand",
                ));
            }
            execute_command(cmd, &settings)
        }
        None => commands::run_patch(&cli.patch, &settings),
    }
}

fn execute_command(cmd: Commands, settings: &blockpatch_core::Settings) -> Result<()> {
    match cmd {
        Commands::Referrers(args) => commands::run_referrers(&args, settings),
        Commands::IssueCerts(args) => commands::run_issue_certs(&args, settings),
        Commands::Completions { .. } => Ok(()),
    }
}
