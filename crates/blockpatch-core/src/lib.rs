//! Marked-block patching for hand-edited configuration files.
//!
//! A managed region is the run of lines between two literal marker lines:
//!
//! ```text
//! # BEGIN blockpatch referrer-ignore
//! ignore-referrer spam.example
//! # END blockpatch referrer-ignore
//! ```
//!
//! [`splice`] rewrites that region in a string; [`Patcher`] applies the same
//! operation to a file with backups, dry runs and atomic replacement. The
//! [`source`], [`rules`] and [`certs`] modules model the collaborators that
//! produce payloads and consume domain lists.

pub mod certs;
pub mod error;
pub mod marker;
pub mod patcher;
pub mod rules;
pub mod settings;
pub mod source;
pub mod splice;

pub use certs::{CertbotIssuer, CertificateIssuer, IssueReport, issue_from_list, parse_domain_list};
pub use error::{Error, RegionError, Result};
pub use marker::MarkerPair;
pub use patcher::{PatchAction, PatchOptions, PatchOutcome, Patcher};
pub use rules::{RuleStyle, RuleTransform};
pub use settings::Settings;
pub use source::{CommandSource, FileSource, PayloadSource, ReaderSource};
pub use splice::{DuplicatePolicy, Spliced};
