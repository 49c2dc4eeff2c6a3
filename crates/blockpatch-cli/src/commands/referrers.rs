//! Referrer-ignore regeneration

use blockpatch_core::{
    CommandSource, FileSource, MarkerPair, PayloadSource, Patcher, RuleTransform, Settings,
};

use super::{patch_options, report};
use crate::cli::ReferrerArgs;
use crate::error::{CliError, Result};

/// Fetch the spam list, turn it into rules and upsert them into the
/// referrer-ignore region of the GoAccess config.
pub fn run_referrers(args: &ReferrerArgs, settings: &Settings) -> Result<()> {
    let defaults = &settings.referrers;

    let file = args
        .file
        .clone()
        .or_else(|| defaults.file.clone())
        .ok_or_else(|| CliError::user("--file is required"))?;
    let markers = MarkerPair::new(
        args.begin.clone().unwrap_or_else(|| defaults.begin.clone()),
        args.end.clone().unwrap_or_else(|| defaults.end.clone()),
    )?;

    let mut source = select_source(args, settings)?;
    tracing::debug!(source = %source.describe(), "fetching referrer list");
    let entries = source.fetch_lines()?;

    let transform = RuleTransform::new(
        args.directive
            .clone()
            .unwrap_or_else(|| defaults.directive.clone()),
        args.style.map(Into::into).unwrap_or(defaults.style),
    );
    let rules = transform.transform(&entries);

    if rules.is_empty() && !args.allow_empty {
        return Err(CliError::user(format!(
            "{} produced no rules; refusing to empty the region (use --allow-empty)",
            source.describe()
        )));
    }
    tracing::info!(entries = entries.len(), rules = rules.len(), "generated referrer rules");

    let patcher = Patcher::new(markers, patch_options(settings.patch.options(), &args.write));
    let outcome = patcher.upsert(&file, &rules)?;

    report(&outcome, args.write.diff)
}

fn select_source(args: &ReferrerArgs, settings: &Settings) -> Result<Box<dyn PayloadSource>> {
    let defaults = &settings.referrers;

    if let Some(path) = &args.source_file {
        return Ok(Box::new(FileSource::new(path)));
    }
    if !args.source_command.is_empty() {
        return Ok(Box::new(CommandSource::from_argv(&args.source_command)?));
    }
    if let Some(path) = &defaults.source_file {
        return Ok(Box::new(FileSource::new(path)));
    }
    if !defaults.source_command.is_empty() {
        return Ok(Box::new(CommandSource::from_argv(&defaults.source_command)?));
    }
    Err(CliError::user(
        "a spam list is required: pass --source-file PATH or -- COMMAND [ARGS...]",
    ))
}
