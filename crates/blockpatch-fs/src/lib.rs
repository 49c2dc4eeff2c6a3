//! Filesystem layer for blockpatch
//!
//! Provides atomic file replacement, timestamped backups, an opt-in advisory
//! lock and format-agnostic configuration loading.

pub mod backup;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use lock::FileLock;
