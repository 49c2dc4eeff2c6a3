//! Command implementations for blockpatch

pub mod certs;
pub mod patch;
pub mod referrers;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use blockpatch_core::{PatchOptions, PatchOutcome, Settings};
use blockpatch_fs::ConfigStore;

use crate::cli::WriteArgs;
use crate::error::Result;

pub use certs::run_issue_certs;
pub use patch::run_patch;
pub use referrers::run_referrers;

/// Load settings from `path`, or defaults when no settings file was given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            Ok(ConfigStore::new().load(path)?)
        }
        None => Ok(Settings::default()),
    }
}

/// Patch options from the settings file, overridden by command-line flags.
pub(crate) fn patch_options(base: PatchOptions, write: &WriteArgs) -> PatchOptions {
    let mut options = base;
    if write.no_backup {
        options.backup = false;
    }
    options.dry_run = write.dry_run;
    if let Some(policy) = write.on_duplicate {
        options.duplicates = policy.into();
    }
    if let Some(secs) = write.lock_timeout {
        options.robustness.lock_timeout = Some(Duration::from_secs(secs));
    }
    options
}

/// Print the result of a patch.
///
/// In a dry run the rendered file (or diff) goes to stdout and the status
/// line to stderr. The rendered file is written as raw bytes.
pub(crate) fn report(outcome: &PatchOutcome, diff: bool) -> Result<()> {
    let path = outcome.path.display();

    if outcome.dry_run {
        let mut stdout = io::stdout().lock();
        if diff {
            stdout.write_all(outcome.diff().as_bytes())?;
        } else {
            stdout.write_all(&outcome.content)?;
        }
        stdout.flush()?;
        eprintln!(
            "{} {} in {} (dry run, nothing written)",
            "DRY-RUN".yellow().bold(),
            outcome.action,
            path
        );
        return Ok(());
    }

    if !outcome.changed {
        match outcome.action {
            blockpatch_core::PatchAction::NothingToDelete => {
                println!("{} nothing to delete in {}", "INFO".blue().bold(), path)
            }
            _ => println!("{} {} already up to date", "OK".green().bold(), path),
        }
        return Ok(());
    }

    println!("{} {} in {}", "OK".green().bold(), outcome.action, path);
    if let Some(backup) = &outcome.backup {
        println!("   {} backup at {}", "+".green(), backup.display());
    }
    Ok(())
}
