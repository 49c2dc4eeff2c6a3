//! Upsert and delete of a managed region in a file on disk.

use std::path::{Path, PathBuf};

use blockpatch_fs::{FileLock, RobustnessConfig, backup, io};
use chrono::{DateTime, Utc};
use similar::TextDiff;

use crate::error::{Error, RegionError, Result};
use crate::marker::MarkerPair;
use crate::splice::{self, DuplicatePolicy};

/// Options for a patch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Copy the file to `<path>.bak.<timestamp>` before replacing it.
    pub backup: bool,
    /// Render the result without touching the filesystem.
    pub dry_run: bool,
    pub duplicates: DuplicatePolicy,
    pub robustness: RobustnessConfig,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            backup: true,
            dry_run: false,
            duplicates: DuplicatePolicy::default(),
            robustness: RobustnessConfig::default(),
        }
    }
}

/// What a patch did (or would do, in a dry run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    /// No region existed; one was appended.
    Inserted,
    /// An existing region was rewritten.
    Replaced,
    /// The region was removed.
    Removed,
    /// Delete found no begin marker. Not an error.
    NothingToDelete,
}

impl std::fmt::Display for PatchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Inserted => "inserted managed region",
            Self::Replaced => "replaced managed region",
            Self::Removed => "removed managed region",
            Self::NothingToDelete => "nothing to delete",
        };
        f.write_str(text)
    }
}

/// Outcome of [`Patcher::upsert`] or [`Patcher::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub path: PathBuf,
    pub action: PatchAction,
    /// Bytes before the patch (empty if the file did not exist).
    pub original: Vec<u8>,
    /// Bytes after the patch.
    pub content: Vec<u8>,
    /// Whether `content` differs from what was on disk.
    pub changed: bool,
    /// Backup written before the replacement, if any.
    pub backup: Option<PathBuf>,
    pub dry_run: bool,
}

impl PatchOutcome {
    /// Whether the file on disk was replaced.
    pub fn written(&self) -> bool {
        self.changed && !self.dry_run
    }

    /// Unified diff from the original to the patched content.
    ///
    /// Invalid UTF-8 is shown with replacement characters.
    pub fn diff(&self) -> String {
        let display = self.path.display().to_string();
        let original = String::from_utf8_lossy(&self.original);
        let content = String::from_utf8_lossy(&self.content);
        TextDiff::from_lines(original.as_ref(), content.as_ref())
            .unified_diff()
            .context_radius(3)
            .header(&format!("{display} (current)"), &format!("{display} (patched)"))
            .to_string()
    }
}

enum Operation<'a> {
    Upsert(&'a [String]),
    Delete,
}

/// Applies marked-block patches to files.
///
/// The markers are validated once at construction; every patch reads the
/// file, splices it in memory and, unless dry-running or unchanged, backs it
/// up and atomically replaces it.
#[derive(Debug, Clone)]
pub struct Patcher {
    markers: MarkerPair,
    options: PatchOptions,
    clock: fn() -> DateTime<Utc>,
}

impl Patcher {
    pub fn new(markers: MarkerPair, options: PatchOptions) -> Self {
        Self {
            markers,
            options,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to timestamp backups.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Insert or replace the managed region of `path` with `payload`.
    ///
    /// A missing file (and its parent directories) is created unless this
    /// is a dry run.
    pub fn upsert(&self, path: &Path, payload: &[String]) -> Result<PatchOutcome> {
        self.apply(path, Operation::Upsert(payload))
    }

    /// Remove the managed region of `path`.
    ///
    /// A file without the begin marker, or no file at all, yields
    /// `PatchAction::NothingToDelete` and is left alone.
    pub fn delete(&self, path: &Path) -> Result<PatchOutcome> {
        self.apply(path, Operation::Delete)
    }

    fn apply(&self, path: &Path, operation: Operation<'_>) -> Result<PatchOutcome> {
        let _lock = match self.options.robustness.lock_timeout {
            Some(timeout) if !self.options.dry_run => Some(FileLock::acquire(path, timeout)?),
            _ => None,
        };

        let existing = io::read_bytes_if_exists(path)?;
        let existed = existing.is_some();
        let original = existing.unwrap_or_default();
        let policy = self.options.duplicates;

        let (spliced, action) = match operation {
            Operation::Upsert(payload) => {
                let spliced = splice::upsert(&original, &self.markers, payload, policy);
                let spliced = malformed(path, spliced)?;
                let action = if spliced.regions_found > 0 {
                    PatchAction::Replaced
                } else {
                    PatchAction::Inserted
                };
                (spliced, action)
            }
            Operation::Delete => {
                let spliced = malformed(path, splice::remove(&original, &self.markers, policy))?;
                let action = if spliced.regions_found > 0 {
                    PatchAction::Removed
                } else {
                    PatchAction::NothingToDelete
                };
                (spliced, action)
            }
        };

        let changed = spliced.content != original;

        let mut outcome = PatchOutcome {
            path: path.to_path_buf(),
            action,
            original,
            content: spliced.content,
            changed,
            backup: None,
            dry_run: self.options.dry_run,
        };

        if outcome.dry_run {
            tracing::debug!(path = %path.display(), %action, changed, "dry run, not writing");
            return Ok(outcome);
        }
        if !outcome.changed {
            tracing::debug!(path = %path.display(), %action, "content unchanged, not writing");
            return Ok(outcome);
        }

        if self.options.backup && existed {
            outcome.backup = Some(backup::create_backup(path, (self.clock)())?);
        }
        io::write_atomic(path, &outcome.content, self.options.robustness)?;

        tracing::info!(
            path = %path.display(),
            %action,
            backup = ?outcome.backup,
            "patched file"
        );
        Ok(outcome)
    }
}

fn malformed<T>(path: &Path, result: std::result::Result<T, RegionError>) -> Result<T> {
    result.map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
