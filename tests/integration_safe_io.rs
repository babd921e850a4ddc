/// Integration tests for retrying file I/O
///
/// Transient failures are injected through a `FileOps` backend so the retry
/// schedule can be checked without real lock contention.

mod common;

use common::test_helpers::{safe_io_with, LockedOps};
use faultline::io::{self as safe_io, OpenMode};
use faultline::{AppError, SafeFileIo};
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_persistent_lock_exhausts_retries_with_backoff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.wav");
    let ops = Arc::new(LockedOps::new(u32::MAX, io::ErrorKind::PermissionDenied));
    let (safe, sleeper) = safe_io_with(ops.clone());

    let err = safe.scoped_open(&path, OpenMode::Write).unwrap_err();

    assert_eq!(ops.calls(), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
    match err {
        AppError::FileOperation(e) => {
            assert_eq!(e.path, path);
            assert_eq!(e.attempts, 3);
        }
        other => panic!("expected FileOperation, got {:?}", other),
    }
}

#[test]
fn test_lock_released_before_last_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    let ops = Arc::new(LockedOps::new(2, io::ErrorKind::PermissionDenied));
    let (safe, sleeper) = safe_io_with(ops.clone());

    assert!(safe.safe_write(&path, "recovered"));
    assert_eq!(ops.calls(), 3);
    assert_eq!(sleeper.delays().len(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "recovered");
}

#[test]
fn test_non_transient_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let ops = Arc::new(LockedOps::new(1, io::ErrorKind::InvalidData));
    let (safe, sleeper) = safe_io_with(ops.clone());

    let err = safe
        .scoped_open(dir.path().join("x.txt"), OpenMode::Write)
        .unwrap_err();

    assert!(matches!(err, AppError::Io(ref e) if e.kind() == io::ErrorKind::InvalidData));
    assert_eq!(ops.calls(), 1);
    assert!(sleeper.delays().is_empty());
}

#[test]
fn test_remove_missing_path_does_not_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let ops = Arc::new(LockedOps::new(0, io::ErrorKind::PermissionDenied));
    let (safe, _) = safe_io_with(ops.clone());

    assert!(safe.safe_remove(dir.path().join("never-created.tmp")));
    assert_eq!(ops.calls(), 0);
}

#[test]
fn test_remove_retries_locked_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.tmp");
    std::fs::write(&path, b"x").unwrap();
    let ops = Arc::new(LockedOps::new(1, io::ErrorKind::PermissionDenied));
    let (safe, sleeper) = safe_io_with(ops.clone());

    assert!(safe.safe_remove(&path));
    assert!(!path.exists());
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(100)]);
}

#[test]
fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");

    assert!(safe_io::safe_write(&path, "hello"));
    assert_eq!(safe_io::safe_read(&path).as_deref(), Some("hello"));
}

#[test]
fn test_read_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(safe_io::safe_read(dir.path().join("missing.txt")), None);
}

#[test]
fn test_ensure_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("keep.txt");
    std::fs::write(&marker, "stay").unwrap();

    assert!(safe_io::ensure_directory(dir.path()));
    assert!(safe_io::ensure_directory(dir.path()));
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "stay");
}

#[test]
fn test_ensure_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("c");

    assert!(safe_io::ensure_directory(&nested));
    assert!(nested.is_dir());
}

#[test]
fn test_scoped_open_append_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");

    {
        let mut file = safe_io::scoped_open(&path, OpenMode::Append).unwrap();
        writeln!(file, "first").unwrap();
    }
    {
        let mut file = safe_io::scoped_open(&path, OpenMode::Append).unwrap();
        writeln!(file, "second").unwrap();
        file.close().unwrap();
    }

    let mut content = String::new();
    safe_io::scoped_open(&path, OpenMode::Read)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "first\nsecond\n");
}

#[test]
fn test_temp_file_is_closed_and_kept() {
    let path = safe_io::create_temp_file(".wav", "faultline_test_").unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    assert!(name.starts_with("faultline_test_"));
    assert!(name.ends_with(".wav"));
    assert!(path.exists());

    // Unlocked: can be written and removed right away
    assert!(safe_io::safe_write(&path, "RIFF"));
    assert!(safe_io::safe_remove(&path));
}

#[test]
fn test_temp_audio_file_defaults() {
    let path = SafeFileIo::default().create_temp_audio_file().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    assert!(name.starts_with("app_audio_"));
    assert!(name.ends_with(".mp3"));
    std::fs::remove_file(&path).unwrap();
}
