// Tests for lib.rs core types
//
// Tests cover: AppError display, taxonomy tags, type names, conversions and Clone.

use super::*;
use std::io;
use std::path::PathBuf;

fn file_op_error() -> FileOperationError {
    FileOperationError {
        path: PathBuf::from("/tmp/locked.txt"),
        attempts: 3,
        source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
    }
}

// ==================== DISPLAY TESTS ====================

#[test]
fn test_configuration_error_display() {
    let err = AppError::Configuration("missing key".to_string());
    assert_eq!(err.to_string(), "Configuration error: missing key");
}

#[test]
fn test_network_error_display() {
    let err = AppError::Network("connection reset".to_string());
    assert!(err.to_string().contains("Network error"));
    assert!(err.to_string().contains("connection reset"));
}

#[test]
fn test_file_operation_error_display_is_transparent() {
    let err = AppError::from(file_op_error());
    let text = err.to_string();
    assert!(text.starts_with("Failed to open /tmp/locked.txt after 3 attempts"));
    assert!(text.contains("access denied"));
}

#[test]
fn test_panicked_display() {
    let err = AppError::Panicked("index out of bounds".to_string());
    assert!(err.to_string().contains("panicked"));
}

// ==================== TAXONOMY TESTS ====================

#[test]
fn test_every_variant_has_a_kind() {
    let cases = vec![
        (AppError::Configuration(String::new()), ErrorKind::Configuration),
        (AppError::Provider(String::new()), ErrorKind::Provider),
        (AppError::Audio(String::new()), ErrorKind::Audio),
        (AppError::Camera(String::new()), ErrorKind::Camera),
        (AppError::FileOperation(file_op_error()), ErrorKind::FileOperation),
        (AppError::Plugin(String::new()), ErrorKind::Plugin),
        (AppError::Model(String::new()), ErrorKind::Model),
        (AppError::Indexing(String::new()), ErrorKind::Indexing),
        (AppError::Network(String::new()), ErrorKind::Network),
        (
            AppError::Io(io::Error::new(io::ErrorKind::Other, "x")),
            ErrorKind::Io,
        ),
        (AppError::Panicked(String::new()), ErrorKind::Panic),
    ];

    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "wrong kind for {:?}", err);
    }
}

#[test]
fn test_type_names_end_with_error() {
    let names = [
        AppError::Configuration(String::new()).type_name(),
        AppError::Provider(String::new()).type_name(),
        AppError::Audio(String::new()).type_name(),
        AppError::Camera(String::new()).type_name(),
        AppError::FileOperation(file_op_error()).type_name(),
        AppError::Plugin(String::new()).type_name(),
        AppError::Model(String::new()).type_name(),
        AppError::Indexing(String::new()).type_name(),
        AppError::Network(String::new()).type_name(),
        AppError::Io(io::Error::new(io::ErrorKind::Other, "x")).type_name(),
    ];

    for name in names {
        assert!(name.ends_with("Error"), "{} should end with Error", name);
    }
    assert_eq!(AppError::Panicked(String::new()).type_name(), "Panic");
}

#[test]
fn test_camera_error_matches_specific_and_general() {
    let err: anyhow::Error = AppError::Camera("no device".to_string()).into();

    // Narrow: exactly the camera variant
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Camera(_))
    ));
    // Broad: any application error
    assert!(err.downcast_ref::<AppError>().is_some());
}

// ==================== CONVERSION TESTS ====================

#[test]
fn test_io_error_converts() {
    let err: AppError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(err, AppError::Io(_)));
    assert!(err.to_string().contains("gone"));
}

#[test]
fn test_question_mark_propagation() {
    fn open_missing() -> AppResult<()> {
        std::fs::File::open("/nonexistent/faultline/file")?;
        Ok(())
    }

    assert!(matches!(open_missing(), Err(AppError::Io(_))));
}

// ==================== CLONE TESTS ====================

#[test]
fn test_clone_preserves_io_kind_and_message() {
    let err = AppError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
    let cloned = err.clone();

    match cloned {
        AppError::Io(e) => {
            assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
            assert_eq!(e.to_string(), "locked");
        }
        other => panic!("unexpected clone: {:?}", other),
    }
}

#[test]
fn test_clone_file_operation_error() {
    let err = AppError::FileOperation(file_op_error());
    let cloned = err.clone();

    assert_eq!(err.to_string(), cloned.to_string());
    match cloned {
        AppError::FileOperation(e) => {
            assert_eq!(e.attempts, 3);
            assert_eq!(e.path, PathBuf::from("/tmp/locked.txt"));
            assert_eq!(e.source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected clone: {:?}", other),
    }
}
