//! Payload sources.
//!
//! A [`PayloadSource`] produces the raw lines that end up (possibly after a
//! [`crate::rules::RuleTransform`]) inside the managed region. Remote lists
//! are fetched by an external program through [`CommandSource`], e.g.
//! `curl -fsSL <url>`.

use std::io::Read;
use std::path::PathBuf;
use std::process::Command;

use blockpatch_fs::io;

use crate::error::{Error, Result};

/// Something that yields payload lines.
pub trait PayloadSource {
    /// Fetch the lines, terminators removed.
    fn fetch_lines(&mut self) -> Result<Vec<String>>;

    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;
}

/// Split text into lines, accepting both `\n` and `\r\n`.
pub fn split_payload(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// Lines of a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PayloadSource for FileSource {
    fn fetch_lines(&mut self) -> Result<Vec<String>> {
        let text = io::read_text(&self.path)?;
        Ok(split_payload(&text))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Lines read from any reader, typically stdin.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    name: String,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
        }
    }
}

impl ReaderSource<std::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin(), "<stdin>")
    }
}

impl<R: Read> PayloadSource for ReaderSource<R> {
    fn fetch_lines(&mut self) -> Result<Vec<String>> {
        let mut text = String::new();
        self.reader
            .read_to_string(&mut text)
            .map_err(|e| Error::Source {
                origin: self.name.clone(),
                message: e.to_string(),
            })?;
        Ok(split_payload(&text))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Stdout lines of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv vector (`["curl", "-fsSL", url]`).
    ///
    /// # Errors
    /// Returns `Error::Source` if `argv` is empty.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        match argv.split_first() {
            Some((program, args)) => Ok(Self::new(program.clone(), args.to_vec())),
            None => Err(Error::Source {
                origin: "<command>".into(),
                message: "empty command line".into(),
            }),
        }
    }
}

impl PayloadSource for CommandSource {
    fn fetch_lines(&mut self) -> Result<Vec<String>> {
        tracing::debug!(command = %self.describe(), "running payload command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| Error::Source {
                origin: self.describe(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: self.describe(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(split_payload(&String::from_utf8_lossy(&output.stdout)))
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_payload_strips_crlf() {
        assert_eq!(split_payload("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert!(split_payload("").is_empty());
    }

    #[test]
    fn reader_source_reads_all_lines() {
        let mut source = ReaderSource::new("one\ntwo\n".as_bytes(), "<test>");
        assert_eq!(source.fetch_lines().unwrap(), vec!["one", "two"]);
        assert_eq!(source.describe(), "<test>");
    }

    #[test]
    fn from_argv_requires_program() {
        assert!(CommandSource::from_argv(&[]).is_err());
        let source = CommandSource::from_argv(&["curl".into(), "-fsSL".into()]).unwrap();
        assert_eq!(source.describe(), "curl -fsSL");
    }
}
