//! Certificate issuance from a domain list.
//!
//! Each non-comment line of the list names the domains of one certificate,
//! separated by whitespace or commas:
//!
//! ```text
//! # wiki
//! wiki.example.org www.wiki.example.org
//! img.example.org
//! ```
//!
//! Issuance itself is delegated to a [`CertificateIssuer`]; [`CertbotIssuer`]
//! shells out to `certbot`.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Parse a domain list into one domain group per certificate.
pub fn parse_domain_list(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let mut domains: Vec<String> = Vec::new();
            for domain in line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|d| !d.is_empty())
                .map(str::to_lowercase)
            {
                if !domains.contains(&domain) {
                    domains.push(domain);
                }
            }
            domains
        })
        .collect()
}

/// Requests a certificate covering `domains`.
pub trait CertificateIssuer {
    fn issue(&self, domains: &[String]) -> Result<()>;
}

/// Issues certificates by running `certbot certonly`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertbotIssuer {
    pub program: String,
    pub webroot: Option<PathBuf>,
    pub email: Option<String>,
    pub staging: bool,
    /// Pass `--dry-run` to certbot (test against the staging server).
    pub dry_run: bool,
    pub extra_args: Vec<String>,
}

impl Default for CertbotIssuer {
    fn default() -> Self {
        Self {
            program: "certbot".into(),
            webroot: None,
            email: None,
            staging: false,
            dry_run: false,
            extra_args: Vec::new(),
        }
    }
}

impl CertbotIssuer {
    /// Arguments passed to certbot for one certificate.
    pub fn command_args(&self, domains: &[String]) -> Vec<String> {
        let mut args: Vec<String> = [
            "certonly",
            "--non-interactive",
            "--agree-tos",
            "--keep-until-expiring",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        if let Some(webroot) = &self.webroot {
            args.push("--webroot".into());
            args.push("-w".into());
            args.push(webroot.display().to_string());
        }
        match &self.email {
            Some(email) => {
                args.push("-m".into());
                args.push(email.clone());
            }
            None => args.push("--register-unsafely-without-email".into()),
        }
        if self.staging {
            args.push("--staging".into());
        }
        if self.dry_run {
            args.push("--dry-run".into());
        }
        args.extend(self.extra_args.iter().cloned());

        if let Some(primary) = domains.first() {
            args.push("--cert-name".into());
            args.push(primary.clone());
        }
        for domain in domains {
            args.push("-d".into());
            args.push(domain.clone());
        }
        args
    }
}

impl CertificateIssuer for CertbotIssuer {
    fn issue(&self, domains: &[String]) -> Result<()> {
        let args = self.command_args(domains);
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!(%command, "running certbot");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::Source {
                origin: self.program.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// A certificate request that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedIssue {
    pub domains: Vec<String>,
    pub message: String,
}

/// Result of [`issue_from_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueReport {
    pub issued: Vec<Vec<String>>,
    pub failed: Vec<FailedIssue>,
    /// Groups never attempted because an earlier one failed.
    pub skipped: Vec<Vec<String>>,
}

impl IssueReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Request a certificate for every domain group, in order.
///
/// Stops at the first failure unless `keep_going` is set.
pub fn issue_from_list<I: CertificateIssuer + ?Sized>(
    issuer: &I,
    groups: &[Vec<String>],
    keep_going: bool,
) -> IssueReport {
    let mut report = IssueReport::default();

    for (idx, domains) in groups.iter().enumerate() {
        if domains.is_empty() {
            continue;
        }
        match issuer.issue(domains) {
            Ok(()) => {
                tracing::info!(domains = %domains.join(","), "certificate issued");
                report.issued.push(domains.clone());
            }
            Err(e) => {
                tracing::warn!(
                    domains = %domains.join(","),
                    error = %e,
                    "certificate request failed"
                );
                report.failed.push(FailedIssue {
                    domains: domains.clone(),
                    message: e.to_string(),
                });
                if !keep_going {
                    report.skipped = groups[idx + 1..].to_vec();
                    break;
                }
            }
        }
    }

    report
}
