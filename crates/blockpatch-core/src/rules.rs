//! Referrer-spam list to GoAccess rule lines.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Default GoAccess directive prefixed to every rule.
pub const DEFAULT_DIRECTIVE: &str = "ignore-referrer";

static BARE_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+(\.[a-z0-9-]+)+$").expect("valid hostname regex"));

/// How an entry becomes a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleStyle {
    /// Anchored host regex for bare hostnames, substring otherwise.
    #[default]
    Auto,
    /// `<directive> <entry>`.
    Substring,
    /// `<directive> ^([a-z0-9-]+\.)*<escaped entry>$`.
    HostRegex,
}

/// Turns raw list lines into finalized, sorted, deduplicated rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTransform {
    directive: String,
    style: RuleStyle,
}

impl Default for RuleTransform {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTIVE, RuleStyle::default())
    }
}

impl RuleTransform {
    pub fn new(directive: impl Into<String>, style: RuleStyle) -> Self {
        Self {
            directive: directive.into(),
            style,
        }
    }

    /// Normalize one list entry, or `None` for blanks and `#` comments.
    pub fn normalize(raw: &str) -> Option<String> {
        let entry = raw.trim_end_matches('\r').trim();
        if entry.is_empty() || entry.starts_with('#') {
            return None;
        }
        Some(entry.to_lowercase())
    }

    /// Render a normalized entry as a rule line.
    pub fn rule_for(&self, entry: &str) -> String {
        let style = match self.style {
            RuleStyle::Auto if BARE_HOSTNAME.is_match(entry) => RuleStyle::HostRegex,
            RuleStyle::Auto => RuleStyle::Substring,
            other => other,
        };

        match style {
            RuleStyle::HostRegex => {
                format!(r"{} ^([a-z0-9-]+\.)*{}$", self.directive, regex::escape(entry))
            }
            _ => format!("{} {}", self.directive, entry),
        }
    }

    /// Transform a whole list. Output is sorted case-insensitively with
    /// case-insensitive duplicates removed.
    pub fn transform<S: AsRef<str>>(&self, raw_lines: &[S]) -> Vec<String> {
        let mut rules: Vec<String> = raw_lines
            .iter()
            .filter_map(|line| Self::normalize(line.as_ref()))
            .map(|entry| self.rule_for(&entry))
            .collect();

        rules.sort_by_cached_key(|rule| rule.to_lowercase());
        rules.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());

        tracing::debug!(input = raw_lines.len(), rules = rules.len(), "transformed list");
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_skips_comments_and_blanks() {
        assert_eq!(RuleTransform::normalize("  # comment"), None);
        assert_eq!(RuleTransform::normalize(" \r"), None);
        assert_eq!(
            RuleTransform::normalize(" Spam.Example\r").as_deref(),
            Some("spam.example")
        );
    }

    #[test]
    fn auto_style_picks_by_entry_shape() {
        let transform = RuleTransform::default();
        assert_eq!(
            transform.rule_for("spam.example"),
            r"ignore-referrer ^([a-z0-9-]+\.)*spam\.example$"
        );
        assert_eq!(transform.rule_for("free-money"), "ignore-referrer free-money");
    }

    #[test]
    fn substring_style_keeps_entry() {
        let transform = RuleTransform::new("ignore-referrer", RuleStyle::Substring);
        assert_eq!(transform.rule_for("spam.example"), "ignore-referrer spam.example");
    }
}
