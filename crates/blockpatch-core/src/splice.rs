//! Line-oriented splice of a managed region.
//!
//! Content is scanned once, left to right, by a two-state machine:
//!
//! - [`ScanState::Outside`] copies lines verbatim. A line equal to the begin
//!   marker emits the replacement region (first time only) and moves to
//!   `Inside`.
//! - [`ScanState::Inside`] drops lines. A line equal to the end marker moves
//!   back to `Outside`.
//!
//! At end of input an upsert that never met the begin marker appends the
//! region. Ending `Inside` means the region was never closed, which is
//! reported instead of silently dropping the rest of the file.

use serde::Deserialize;

use crate::error::RegionError;
use crate::marker::MarkerPair;

/// How a file with more than one begin marker is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Remove every `begin..end` span; the new region takes the place of the
    /// first one.
    #[default]
    Collapse,
    /// Refuse to touch a file whose begin marker occurs more than once.
    Reject,
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Outside,
    /// Inside a region opened on the given 1-based line.
    Inside { opened_at: usize },
}

/// Result of a splice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    /// The rewritten content.
    pub content: Vec<u8>,
    /// Number of `begin..end` spans found in the input.
    pub regions_found: usize,
    /// 1-based line of the first begin marker, if any.
    pub first_region_line: Option<usize>,
}

/// One input line, with and without its terminator.
struct Line<'a> {
    raw: &'a [u8],
    text: &'a [u8],
}

/// Split on `\n`. A `\r` before the `\n`, or ending an unterminated last
/// line, is part of the terminator.
fn split_lines(content: &[u8]) -> Vec<Line<'_>> {
    content
        .split_inclusive(|&b| b == b'\n')
        .map(|raw| {
            let text = raw.strip_suffix(b"\n").unwrap_or(raw);
            let text = text.strip_suffix(b"\r").unwrap_or(text);
            Line { raw, text }
        })
        .collect()
}

/// Terminator used for emitted lines: that of the first terminated line.
/// Content with no `\n` at all is CRLF only if it ends in a bare `\r`.
fn detect_eol(lines: &[Line<'_>]) -> &'static [u8] {
    let crlf = match lines.iter().find(|line| line.raw.ends_with(b"\n")) {
        Some(line) => line.raw.ends_with(b"\r\n"),
        None => lines.last().is_some_and(|line| line.raw.ends_with(b"\r")),
    };
    if crlf { &b"\r\n"[..] } else { &b"\n"[..] }
}

fn emit_region(out: &mut Vec<u8>, markers: &MarkerPair, payload: &[String], eol: &[u8]) {
    out.extend_from_slice(markers.begin().as_bytes());
    out.extend_from_slice(eol);
    for line in payload {
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(eol);
    }
    out.extend_from_slice(markers.end().as_bytes());
    out.extend_from_slice(eol);
}

/// Replace the managed region with `payload`, or append it if absent.
///
/// Content need not be UTF-8. Lines outside the region are copied byte for
/// byte. Payload lines are written as given; a payload line equal to a
/// marker will confuse the next scan.
///
/// # Example
/// ```
/// use blockpatch_core::{DuplicatePolicy, MarkerPair, splice};
///
/// let markers = MarkerPair::new("# B", "# E").unwrap();
/// let payload = vec!["new".to_string()];
/// let result = splice::upsert(
///     "keep-me\n# B\nold\n# E\nkeep-me-too\n",
///     &markers,
///     &payload,
///     DuplicatePolicy::Collapse,
/// )
/// .unwrap();
/// assert_eq!(result.content, b"keep-me\n# B\nnew\n# E\nkeep-me-too\n");
/// ```
pub fn upsert(
    content: impl AsRef<[u8]>,
    markers: &MarkerPair,
    payload: &[String],
    policy: DuplicatePolicy,
) -> Result<Spliced, RegionError> {
    scan(content.as_ref(), markers, Some(payload), policy)
}

/// Remove the managed region, markers included.
///
/// Content without a begin marker is returned unchanged with
/// `regions_found == 0`.
pub fn remove(
    content: impl AsRef<[u8]>,
    markers: &MarkerPair,
    policy: DuplicatePolicy,
) -> Result<Spliced, RegionError> {
    scan(content.as_ref(), markers, None, policy)
}

fn scan(
    content: &[u8],
    markers: &MarkerPair,
    replacement: Option<&[String]>,
    policy: DuplicatePolicy,
) -> Result<Spliced, RegionError> {
    let lines = split_lines(content);
    let eol = detect_eol(&lines);

    if policy == DuplicatePolicy::Reject {
        let begins: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| markers.is_begin(line.text))
            .map(|(idx, _)| idx + 1)
            .collect();
        if begins.len() > 1 {
            return Err(RegionError::Duplicate { lines: begins });
        }
    }

    let mut out = Vec::with_capacity(content.len());
    let mut state = ScanState::Outside;
    let mut regions_found = 0;
    let mut first_region_line = None;

    for (idx, line) in lines.iter().enumerate() {
        state = match state {
            ScanState::Outside if markers.is_begin(line.text) => {
                regions_found += 1;
                if first_region_line.is_none() {
                    first_region_line = Some(idx + 1);
                    if let Some(payload) = replacement {
                        emit_region(&mut out, markers, payload, eol);
                    }
                }
                ScanState::Inside { opened_at: idx + 1 }
            }
            ScanState::Outside => {
                out.extend_from_slice(line.raw);
                ScanState::Outside
            }
            ScanState::Inside { .. } if markers.is_end(line.text) => ScanState::Outside,
            inside @ ScanState::Inside { .. } => inside,
        };
    }

    if let ScanState::Inside { opened_at } = state {
        return Err(RegionError::Unterminated { line: opened_at });
    }

    if let (None, Some(payload)) = (first_region_line, replacement) {
        match out.last() {
            None | Some(b'\n') => {}
            Some(b'\r') => out.push(b'\n'),
            Some(_) => out.extend_from_slice(eol),
        }
        emit_region(&mut out, markers, payload, eol);
    }

    tracing::debug!(regions_found, ?first_region_line, "scanned content");

    Ok(Spliced {
        content: out,
        regions_found,
        first_region_line,
    })
}
