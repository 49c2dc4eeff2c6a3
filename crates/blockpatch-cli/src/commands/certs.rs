//! Certificate issuance from a domain list

use colored::Colorize;

use blockpatch_core::{
    CertbotIssuer, IssueReport, Settings, issue_from_list, parse_domain_list,
};
use blockpatch_fs::io;

use crate::cli::IssueCertsArgs;
use crate::error::{CliError, Result};

/// Run certbot once per line of the domain list.
pub fn run_issue_certs(args: &IssueCertsArgs, settings: &Settings) -> Result<()> {
    let defaults = &settings.certs;

    let list = args
        .list
        .clone()
        .or_else(|| defaults.list.clone())
        .ok_or_else(|| CliError::user("--list is required"))?;
    let groups = parse_domain_list(&io::read_text(&list)?);

    if groups.is_empty() {
        tracing::warn!(list = %list.display(), "domain list is empty");
        println!("{} no domains listed in {}", "INFO".blue().bold(), list.display());
        return Ok(());
    }

    let issuer = issuer_for(args, settings);
    let report = issue_from_list(&issuer, &groups, args.keep_going || defaults.keep_going);
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        let attempted = report.issued.len() + report.failed.len();
        Err(CliError::user(format!(
            "{} of {} certificate requests failed",
            report.failed.len(),
            attempted
        )))
    }
}

fn issuer_for(args: &IssueCertsArgs, settings: &Settings) -> CertbotIssuer {
    let defaults = &settings.certs;
    CertbotIssuer {
        program: args.certbot.clone().unwrap_or_else(|| defaults.certbot.clone()),
        webroot: args.webroot.clone().or_else(|| defaults.webroot.clone()),
        email: args.email.clone().or_else(|| defaults.email.clone()),
        staging: args.staging || defaults.staging,
        dry_run: args.certbot_dry_run,
        extra_args: defaults.extra_args.clone(),
    }
}

fn print_report(report: &IssueReport) {
    for domains in &report.issued {
        println!("   {} {}", "+".green(), domains.join(" "));
    }
    for failure in &report.failed {
        println!(
            "   {} {}: {}",
            "!".red(),
            failure.domains.join(" "),
            failure.message.dimmed()
        );
    }
    for domains in &report.skipped {
        println!("   {} {} {}", "-".yellow(), domains.join(" "), "(skipped)".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.certs.email = Some("ops@example.org".into());
        settings.certs.webroot = Some(PathBuf::from("/var/www/certbot"));
        settings.certs.extra_args = vec!["--quiet".into()];

        let args = IssueCertsArgs {
            email: Some("admin@example.org".into()),
            certbot_dry_run: true,
            ..IssueCertsArgs::default()
        };
        let issuer = issuer_for(&args, &settings);

        assert_eq!(issuer.program, "certbot");
        assert_eq!(issuer.email.as_deref(), Some("admin@example.org"));
        assert_eq!(issuer.webroot, Some(PathBuf::from("/var/www/certbot")));
        assert!(issuer.dry_run);
        assert_eq!(issuer.extra_args, vec!["--quiet"]);
    }

    #[test]
    fn test_missing_list_is_user_error() {
        let err = run_issue_certs(&IssueCertsArgs::default(), &Settings::default()).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn test_empty_list_succeeds() {
        let temp = tempfile::TempDir::new().unwrap();
        let list = temp.path().join("domains.txt");
        std::fs::write(&list, "# none yet\n\n").unwrap();

        let args = IssueCertsArgs {
            list: Some(list),
            certbot: Some("/nonexistent/certbot".into()),
            ..IssueCertsArgs::default()
        };
        run_issue_certs(&args, &Settings::default()).unwrap();
    }
}
