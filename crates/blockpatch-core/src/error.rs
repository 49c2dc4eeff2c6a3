//! Error types for blockpatch-core

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid markers: {reason}")]
    InvalidMarker { reason: String },

    #[error("Filesystem error: {0}")]
    Fs(#[from] blockpatch_fs::Error),

    #[error("Malformed managed region in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: RegionError,
    },

    #[error("Failed to read payload from {origin}: {message}")]
    Source { origin: String, message: String },

    #[error("Command `{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Structural problems found while scanning for a managed region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("begin marker on line {line} has no matching end marker")]
    Unterminated { line: usize },

    #[error("begin marker appears {} times (lines {lines:?})", .lines.len())]
    Duplicate { lines: Vec<usize> },
}
