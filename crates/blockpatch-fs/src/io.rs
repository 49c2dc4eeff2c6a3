//! Atomic I/O operations

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Tuning knobs for [`write_atomic`] and the lock taken around a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to wait for the advisory lock. `None` disables locking.
    pub lock_timeout: Option<Duration>,
    /// Flush the temp file to disk before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: None,
            enable_fsync: true,
        }
    }
}

/// Path of the temp file used while replacing `path`.
///
/// Always a sibling of `path` so the final rename never crosses filesystems.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so readers observe either the old or the
/// new content, never a partial write. Missing parent directories are
/// created. An existing file's permissions are carried over to the
/// replacement. On failure the temp file is removed and the original is left
/// untouched.
pub fn write_atomic(path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    tracing::debug!(target = %path.display(), temp = %temp_path.display(), "writing temp file");

    let result = write_temp(path, &temp_path, content, config)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() && temp_path.is_file() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_temp(
    target: &Path,
    temp_path: &Path,
    content: &[u8],
    config: RobustnessConfig,
) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    if let Ok(meta) = fs::metadata(target) {
        temp_file
            .set_permissions(meta.permissions())
            .map_err(|e| Error::io(temp_path, e))?;
    }

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if config.enable_fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read a file's raw bytes, returning `None` if it does not exist.
///
/// No encoding is assumed.
pub fn read_bytes_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Open (creating if needed) a file for locking purposes.
pub(crate) fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/etc/goaccess/goaccess.conf"));
        assert_eq!(temp.parent(), Some(Path::new("/etc/goaccess")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".goaccess.conf."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn read_bytes_if_exists_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_bytes_if_exists(&dir.path().join("missing.conf")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn write_atomic_without_fsync() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.conf");
        let config = RobustnessConfig {
            enable_fsync: false,
            ..RobustnessConfig::default()
        };

        write_atomic(&path, b"content\n", config).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "content\n");
    }
}
