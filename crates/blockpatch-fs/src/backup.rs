//! Timestamped backups taken before a file is replaced
//!
//! Backups live next to the original as `<path>.bak.<yyyyMMddHHmmss>` (UTC).
//! An existing backup is never overwritten: if the name is taken, `.1`, `.2`,
//! ... is appended.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// `chrono` format of the backup timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Backup path for `path` taken at `at`, before collision handling.
pub fn backup_path_for(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".bak.{}", at.format(TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

/// Copy `path` to a fresh backup file and return where it went.
///
/// Permissions are preserved by the copy.
pub fn create_backup(path: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
    let base = backup_path_for(path, at);
    let mut candidate = base.clone();
    let mut suffix = 1u32;

    while fs::symlink_metadata(&candidate).is_ok() {
        let mut name: OsString = base.as_os_str().to_os_string();
        name.push(format!(".{suffix}"));
        candidate = PathBuf::from(name);
        suffix += 1;
    }

    fs::copy(path, &candidate).map_err(|e| Error::io(&candidate, e))?;
    tracing::debug!(source = %path.display(), backup = %candidate.display(), "created backup");

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn backup_name_uses_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = backup_path_for(Path::new("/etc/goaccess/goaccess.conf"), at);
        assert_eq!(
            path,
            PathBuf::from("/etc/goaccess/goaccess.conf.bak.20240309070501")
        );
    }
}
