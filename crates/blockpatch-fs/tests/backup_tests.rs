use assert_fs::prelude::*;
use blockpatch_fs::backup::{backup_path_for, create_backup};
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn creates_copy_next_to_original() {
    let temp = assert_fs::TempDir::new().unwrap();
    let conf = temp.child("goaccess.conf");
    conf.write_str("log-format COMBINED\n").unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    let backup = create_backup(conf.path(), at).unwrap();

    assert_eq!(backup, temp.path().join("goaccess.conf.bak.20250102030405"));
    temp.child("goaccess.conf.bak.20250102030405")
        .assert(predicate::str::diff("log-format COMBINED\n"));
}

#[test]
fn never_overwrites_existing_backup() {
    let temp = assert_fs::TempDir::new().unwrap();
    let conf = temp.child("goaccess.conf");
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    conf.write_str("first\n").unwrap();
    let first = create_backup(conf.path(), at).unwrap();
    conf.write_str("second\n").unwrap();
    let second = create_backup(conf.path(), at).unwrap();
    let third = create_backup(conf.path(), at).unwrap();

    assert_eq!(first, backup_path_for(conf.path(), at));
    assert_eq!(
        second,
        temp.path().join("goaccess.conf.bak.20250102030405.1")
    );
    assert_eq!(third, temp.path().join("goaccess.conf.bak.20250102030405.2"));
    temp.child("goaccess.conf.bak.20250102030405")
        .assert(predicate::str::diff("first\n"));
    temp.child("goaccess.conf.bak.20250102030405.1")
        .assert(predicate::str::diff("second\n"));
}

#[test]
fn missing_source_is_an_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    let result = create_backup(&temp.path().join("absent.conf"), at);

    assert!(result.is_err());
}
