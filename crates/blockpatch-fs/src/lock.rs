//! Advisory lock held around a read-modify-rename sequence

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, Result, io};

/// Exclusive advisory lock on `<target>.lock`.
///
/// Released when dropped. The lock file itself is left in place; removing it
/// would let a waiting process lock an unlinked inode.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Lock file path guarding `target`.
    pub fn lock_path_for(target: &Path) -> PathBuf {
        let mut name = target.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock, retrying with exponential backoff until `timeout`.
    pub fn acquire(target: &Path, timeout: Duration) -> Result<Self> {
        let path = Self::lock_path_for(target);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = io::open_lock_file(&path)?;
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(10))
            .with_max_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(timeout))
            .build();

        backoff::retry(policy, || {
            FileExt::try_lock_exclusive(&file).map_err(backoff::Error::transient)
        })
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

        tracing::debug!(lock = %path.display(), "acquired lock");
        Ok(Self { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        tracing::debug!(lock = %self.path.display(), "released lock");
    }
}
