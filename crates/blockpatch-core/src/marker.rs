//! Marker lines delimiting the managed region.

use crate::error::{Error, Result};

/// The `begin`/`end` literals of a managed region.
///
/// Both are compared against whole lines with exact equality: no trimming,
/// no substring or pattern matching. Only the line terminator is excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    begin: String,
    end: String,
}

impl MarkerPair {
    /// Validate and build a marker pair.
    ///
    /// # Errors
    /// Returns `Error::InvalidMarker` if either marker is empty, spans more
    /// than one line, or if both are equal.
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Result<Self> {
        let begin = begin.into();
        let end = end.into();

        for (name, value) in [("begin", &begin), ("end", &end)] {
            if value.is_empty() {
                return Err(invalid(format!("{name} marker is empty")));
            }
            if value.contains(['\n', '\r']) {
                return Err(invalid(format!("{name} marker contains a line break")));
            }
        }
        if begin == end {
            return Err(invalid(format!("begin and end markers are identical ({begin:?})")));
        }

        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Whether a line, terminator removed, is the begin marker.
    pub fn is_begin(&self, line: &[u8]) -> bool {
        line == self.begin.as_bytes()
    }

    pub fn is_end(&self, line: &[u8]) -> bool {
        line == self.end.as_bytes()
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidMarker { reason }
}
