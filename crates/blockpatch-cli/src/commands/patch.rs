//! The default upsert/delete command

use std::path::PathBuf;

use blockpatch_core::{
    FileSource, MarkerPair, PayloadSource, Patcher, ReaderSource, Settings,
};

use super::{patch_options, report};
use crate::cli::PatchArgs;
use crate::error::{CliError, Result};

/// Upsert or delete the managed region described by `args`.
///
/// Flags take precedence over the `[patch]` section of the settings file.
pub fn run_patch(args: &PatchArgs, settings: &Settings) -> Result<()> {
    let file = resolve_file(args, settings)?;
    let begin = args
        .begin
        .clone()
        .or_else(|| settings.patch.begin.clone())
        .ok_or_else(|| CliError::user("--begin is required"))?;
    let end = args
        .end
        .clone()
        .or_else(|| settings.patch.end.clone())
        .ok_or_else(|| CliError::user("--end is required"))?;

    let markers = MarkerPair::new(begin, end)?;
    let patcher = Patcher::new(markers, patch_options(settings.patch.options(), &args.write));

    let outcome = if args.delete {
        patcher.delete(&file)?
    } else {
        let mut source: Box<dyn PayloadSource> = match (&args.payload_file, args.payload_stdin) {
            (Some(path), _) => Box::new(FileSource::new(path)),
            (None, true) => Box::new(ReaderSource::stdin()),
            (None, false) => {
                return Err(CliError::user(
                    "one of --payload-file, --payload-stdin or --delete is required",
                ));
            }
        };
        tracing::debug!(source = %source.describe(), "reading payload");
        let payload = source.fetch_lines()?;
        patcher.upsert(&file, &payload)?
    };

    report(&outcome, args.write.diff)
}

fn resolve_file(args: &PatchArgs, settings: &Settings) -> Result<PathBuf> {
    args.file
        .clone()
        .or_else(|| settings.patch.file.clone())
        .ok_or_else(|| CliError::user("--file is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::WriteArgs;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(file: PathBuf) -> PatchArgs {
        PatchArgs {
            file: Some(file),
            begin: Some("# B".into()),
            end: Some("# E".into()),
            write: WriteArgs {
                no_backup: true,
                ..WriteArgs::default()
            },
            ..PatchArgs::default()
        }
    }

    #[test]
    fn test_upsert_from_payload_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app.conf");
        let payload = temp.path().join("payload.txt");
        fs::write(&target, "a\nb\n").unwrap();
        fs::write(&payload, "X\nY\n").unwrap();

        let args = PatchArgs {
            payload_file: Some(payload),
            ..args_for(target.clone())
        };
        run_patch(&args, &Settings::default()).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nb\n# B\nX\nY\n# E\n");
    }

    #[test]
    fn test_delete_without_region_leaves_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app.conf");
        fs::write(&target, "a\nb\n").unwrap();

        let args = PatchArgs {
            delete: true,
            ..args_for(target.clone())
        };
        run_patch(&args, &Settings::default()).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_missing_mode_is_user_error() {
        let temp = TempDir::new().unwrap();
        let args = args_for(temp.path().join("app.conf"));

        let err = run_patch(&args, &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
        assert!(!temp.path().join("app.conf").exists());
    }

    #[test]
    fn test_markers_come_from_settings() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app.conf");
        fs::write(&target, "a\n# S\nold\n# T\n").unwrap();

        let mut settings = Settings::default();
        settings.patch.file = Some(target.clone());
        settings.patch.begin = Some("# S".into());
        settings.patch.end = Some("# T".into());
        settings.patch.backup = false;

        let args = PatchArgs {
            delete: true,
            ..PatchArgs::default()
        };
        run_patch(&args, &settings).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "a\n");
    }

    #[test]
    fn test_equal_markers_rejected_before_io() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app.conf");
        let args = PatchArgs {
            end: Some("# B".into()),
            delete: true,
            ..args_for(target.clone())
        };

        let err = run_patch(&args, &Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(blockpatch_core::Error::InvalidMarker { .. })
        ));
    }
}
