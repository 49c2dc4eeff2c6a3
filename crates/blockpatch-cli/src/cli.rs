//! CLI argument parsing using clap derive

use std::path::PathBuf;

use blockpatch_core::{DuplicatePolicy, RuleStyle};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// blockpatch - Maintain a marked, auto-generated region inside a config file
///
/// Without a subcommand, upserts (or with --delete removes) the region
/// between --begin and --end in --file.
///
/// Examples:
///   blockpatch --file goaccess.conf --begin '# B' --end '# E' --payload-file rules.txt
///   generate-rules | blockpatch --file goaccess.conf --begin '# B' --end '# E' --payload-stdin
///   blockpatch --file goaccess.conf --begin '# B' --end '# E' --delete --dry-run
#[derive(Parser, Debug)]
#[command(name = "blockpatch")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "BLOCKPATCH_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub patch: PatchArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments of the default upsert/delete mode.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchArgs {
    /// File containing the managed region
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Line that opens the managed region (exact match)
    #[arg(long, value_name = "LITERAL", allow_hyphen_values = true)]
    pub begin: Option<String>,

    /// Line that closes the managed region (exact match)
    #[arg(long, value_name = "LITERAL", allow_hyphen_values = true)]
    pub end: Option<String>,

    /// Read region content from a file
    #[arg(long, value_name = "PATH", conflicts_with_all = ["payload_stdin", "delete"])]
    pub payload_file: Option<PathBuf>,

    /// Read region content from stdin
    #[arg(long, conflicts_with = "delete")]
    pub payload_stdin: bool,

    /// Remove the managed region instead of writing it
    #[arg(long)]
    pub delete: bool,

    #[command(flatten)]
    pub write: WriteArgs,
}

impl PatchArgs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Options shared by every command that rewrites a file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteArgs {
    /// Do not write a .bak.<timestamp> copy before replacing the file
    #[arg(long)]
    pub no_backup: bool,

    /// Print the result instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print a unified diff instead of the whole file
    #[arg(long, requires = "dry_run")]
    pub diff: bool,

    /// What to do when the begin marker occurs more than once
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_duplicate: Option<DuplicateArg>,

    /// Serialize with other blockpatch runs through an advisory lock
    #[arg(long, value_name = "SECS")]
    pub lock_timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateArg {
    Collapse,
    Reject,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Collapse => DuplicatePolicy::Collapse,
            DuplicateArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleArg {
    Auto,
    Substring,
    HostRegex,
}

impl From<StyleArg> for RuleStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Auto => RuleStyle::Auto,
            StyleArg::Substring => RuleStyle::Substring,
            StyleArg::HostRegex => RuleStyle::HostRegex,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Regenerate the referrer-ignore region from a spam list
    ///
    /// Examples:
    ///   blockpatch referrers --file goaccess.conf --source-file spammers.txt
    ///   blockpatch referrers --file goaccess.conf -- curl -fsSL https://example.org/spammers.txt
    Referrers(ReferrerArgs),

    /// Request a certificate for every line of a domain list
    IssueCerts(IssueCertsArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferrerArgs {
    /// GoAccess config file to update
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Read the spam list from a local file
    #[arg(long, value_name = "PATH", conflicts_with = "source_command")]
    pub source_file: Option<PathBuf>,

    /// Program (and arguments) printing the spam list on stdout
    #[arg(last = true, value_name = "COMMAND")]
    pub source_command: Vec<String>,

    /// How list entries become rules
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// Directive prefixed to every rule
    #[arg(long, value_name = "WORD")]
    pub directive: Option<String>,

    /// Line that opens the managed region
    #[arg(long, value_name = "LITERAL", allow_hyphen_values = true)]
    pub begin: Option<String>,

    /// Line that closes the managed region
    #[arg(long, value_name = "LITERAL", allow_hyphen_values = true)]
    pub end: Option<String>,

    /// Write the region even if the list produced no rules
    #[arg(long)]
    pub allow_empty: bool,

    #[command(flatten)]
    pub write: WriteArgs,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueCertsArgs {
    /// Domain list, one certificate per line
    #[arg(long, value_name = "PATH")]
    pub list: Option<PathBuf>,

    /// certbot executable
    #[arg(long, value_name = "PROGRAM")]
    pub certbot: Option<String>,

    /// Webroot used for the HTTP-01 challenge
    #[arg(long, value_name = "DIR")]
    pub webroot: Option<PathBuf>,

    /// Registration email
    #[arg(long, value_name = "ADDR")]
    pub email: Option<String>,

    /// Use the Let's Encrypt staging environment
    #[arg(long)]
    pub staging: bool,

    /// Pass --dry-run to certbot
    #[arg(long)]
    pub certbot_dry_run: bool,

    /// Continue with the remaining lines after a failure
    #[arg(long)]
    pub keep_going: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_upsert_from_payload_file() {
        let cli = Cli::parse_from([
            "blockpatch",
            "--file",
            "goaccess.conf",
            "--begin",
            "# B",
            "--end",
            "# E",
            "--payload-file",
            "rules.txt",
            "--no-backup",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.patch.file, Some(PathBuf::from("goaccess.conf")));
        assert_eq!(cli.patch.begin.as_deref(), Some("# B"));
        assert_eq!(cli.patch.payload_file, Some(PathBuf::from("rules.txt")));
        assert!(cli.patch.write.no_backup);
        assert!(!cli.patch.write.dry_run);
    }

    #[test]
    fn parse_hyphenated_marker() {
        let cli = Cli::parse_from(["blockpatch", "--begin", "-- BEGIN --", "--end", "-- END --"]);
        assert_eq!(cli.patch.begin.as_deref(), Some("-- BEGIN --"));
        assert_eq!(cli.patch.end.as_deref(), Some("-- END --"));
    }

    #[test]
    fn delete_conflicts_with_payload() {
        let result = Cli::try_parse_from(["blockpatch", "--delete", "--payload-stdin"]);
        assert!(result.is_err());
    }

    #[test]
    fn diff_requires_dry_run() {
        let result = Cli::try_parse_from(["blockpatch", "--delete", "--diff"]);
        assert!(result.is_err());
        let cli = Cli::parse_from(["blockpatch", "--delete", "--dry-run", "--diff"]);
        assert!(cli.patch.write.diff);
    }

    #[test]
    fn parse_duplicate_policy() {
        let cli = Cli::parse_from(["blockpatch", "--delete", "--on-duplicate", "reject"]);
        assert_eq!(cli.patch.write.on_duplicate, Some(DuplicateArg::Reject));
    }

    #[test]
    fn no_arguments_is_empty() {
        let cli = Cli::parse_from(["blockpatch"]);
        assert!(cli.patch.is_empty());
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_referrers_with_command() {
        let cli = Cli::parse_from([
            "blockpatch",
            "referrers",
            "--file",
            "goaccess.conf",
            "--style",
            "host-regex",
            "--",
            "curl",
            "-fsSL",
            "https://example.org/list.txt",
        ]);
        match cli.command {
            Some(Commands::Referrers(args)) => {
                assert_eq!(args.style, Some(StyleArg::HostRegex));
                assert_eq!(
                    args.source_command,
                    vec!["curl", "-fsSL", "https://example.org/list.txt"]
                );
            }
            other => panic!("expected referrers, got {other:?}"),
        }
    }

    #[test]
    fn parse_issue_certs() {
        let cli = Cli::parse_from([
            "blockpatch",
            "issue-certs",
            "--list",
            "domains.txt",
            "--staging",
            "--keep-going",
        ]);
        match cli.command {
            Some(Commands::IssueCerts(args)) => {
                assert_eq!(args.list, Some(PathBuf::from("domains.txt")));
                assert!(args.staging);
                assert!(args.keep_going);
                assert!(!args.certbot_dry_run);
            }
            other => panic!("expected issue-certs, got {other:?}"),
        }
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["blockpatch", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["blockpatch", "issue-certs", "-v"]);
        assert!(cli.verbose);
    }
}
