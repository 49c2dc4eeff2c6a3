//! Settings loaded from a configuration file.
//!
//! All sections and keys are optional; command-line flags take precedence
//! over anything set here.
//!
//! ```toml
//! [patch]
//! file = "/etc/goaccess/goaccess.conf"
//! begin = "# BEGIN managed"
//! end = "# END managed"
//! backup = true
//! duplicates = "reject"
//! lock_timeout_secs = 10
//!
//! [referrers]
//! file = "/etc/goaccess/goaccess.conf"
//! source_command = ["curl", "-fsSL", "https://example.org/spammers.txt"]
//! style = "host-regex"
//!
//! [certs]
//! list = "/etc/letsencrypt/domains.txt"
//! webroot = "/var/www/certbot"
//! email = "ops@example.org"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use blockpatch_fs::RobustnessConfig;
use serde::Deserialize;

use crate::patcher::PatchOptions;
use crate::rules::{DEFAULT_DIRECTIVE, RuleStyle};
use crate::splice::DuplicatePolicy;

/// Begin marker of the referrer-ignore region.
pub const DEFAULT_REFERRER_BEGIN: &str = "# BEGIN blockpatch referrer-ignore";
/// End marker of the referrer-ignore region.
pub const DEFAULT_REFERRER_END: &str = "# END blockpatch referrer-ignore";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub patch: PatchSettings,
    pub referrers: ReferrerSettings,
    pub certs: CertSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchSettings {
    pub file: Option<PathBuf>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub backup: bool,
    pub duplicates: DuplicatePolicy,
    pub lock_timeout_secs: Option<u64>,
    pub fsync: bool,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            file: None,
            begin: None,
            end: None,
            backup: true,
            duplicates: DuplicatePolicy::default(),
            lock_timeout_secs: None,
            fsync: true,
        }
    }
}

impl PatchSettings {
    /// Patch options derived from these settings.
    pub fn options(&self) -> PatchOptions {
        PatchOptions {
            backup: self.backup,
            dry_run: false,
            duplicates: self.duplicates,
            robustness: RobustnessConfig {
                lock_timeout: self.lock_timeout_secs.map(Duration::from_secs),
                enable_fsync: self.fsync,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferrerSettings {
    pub file: Option<PathBuf>,
    pub begin: String,
    pub end: String,
    pub source_file: Option<PathBuf>,
    pub source_command: Vec<String>,
    pub style: RuleStyle,
    pub directive: String,
}

impl Default for ReferrerSettings {
    fn default() -> Self {
        Self {
            file: None,
            begin: DEFAULT_REFERRER_BEGIN.into(),
            end: DEFAULT_REFERRER_END.into(),
            source_file: None,
            source_command: Vec::new(),
            style: RuleStyle::default(),
            directive: DEFAULT_DIRECTIVE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertSettings {
    pub list: Option<PathBuf>,
    pub certbot: String,
    pub webroot: Option<PathBuf>,
    pub email: Option<String>,
    pub staging: bool,
    pub keep_going: bool,
    pub extra_args: Vec<String>,
}

impl Default for CertSettings {
    fn default() -> Self {
        Self {
            list: None,
            certbot: "certbot".into(),
            webroot: None,
            email: None,
            staging: false,
            keep_going: false,
            extra_args: Vec::new(),
        }
    }
}
