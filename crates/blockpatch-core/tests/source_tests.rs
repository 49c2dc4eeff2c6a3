use blockpatch_core::{CommandSource, Error, FileSource, PayloadSource};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_source_reads_lines() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("spammers.txt");
    fs::write(&path, "a.example\r\nb.example\n").unwrap();

    let mut source = FileSource::new(&path);

    assert_eq!(source.fetch_lines().unwrap(), vec!["a.example", "b.example"]);
    assert_eq!(source.describe(), path.display().to_string());
}

#[test]
fn test_file_source_missing_file() {
    let mut source = FileSource::new("/nonexistent/spammers.txt");
    assert!(matches!(source.fetch_lines(), Err(Error::Fs(_))));
}

#[cfg(unix)]
#[test]
fn test_command_source_captures_stdout() {
    let script = "printf 'x.example\\ny.example\\n'";
    let mut source = CommandSource::new("sh", vec!["-c".into(), script.into()]);
    assert_eq!(source.fetch_lines().unwrap(), vec!["x.example", "y.example"]);
}

#[cfg(unix)]
#[test]
fn test_command_source_nonzero_exit() {
    let mut source = CommandSource::new("sh", vec!["-c".into(), "echo boom >&2; exit 3".into()]);

    match source.fetch_lines() {
        Err(Error::CommandFailed { code, stderr, .. }) => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "boom");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[test]
fn test_command_source_missing_program() {
    let mut source = CommandSource::new("definitely-not-a-real-program-blockpatch", Vec::new());
    assert!(matches!(source.fetch_lines(), Err(Error::Source { .. })));
}
