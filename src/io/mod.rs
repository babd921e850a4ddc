pub mod platform;
pub mod safe_file;


// Re-exports
pub use platform::{FileOps, StdFileOps};
pub use safe_file::{OpenMode, SafeFileIo, ScopedFile};

use crate::AppResult;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default temp file prefix
pub const DEFAULT_TEMP_PREFIX: &str = "app_audio_";

/// Default temp file suffix
pub const DEFAULT_TEMP_SUFFIX: &str = ".mp3";

/// A file could not be opened because every attempt failed transiently
#[derive(Error, Debug)]
#[error("Failed to open {} after {attempts} attempts: {source}", .path.display())]
pub struct FileOperationError {
    pub path: PathBuf,
    pub attempts: u32,
    pub source: std::io::Error,
}

impl Clone for FileOperationError {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            attempts: self.attempts,
            source: std::io::Error::new(self.source.kind(), self.source.to_string()),
        }
    }
}

// Free functions over the default policy (3 attempts, 100ms base delay)

pub fn scoped_open(path: impl AsRef<Path>, mode: OpenMode) -> AppResult<ScopedFile> {
    SafeFileIo::default().scoped_open(path, mode)
}

pub fn safe_read(path: impl AsRef<Path>) -> Option<String> {
    SafeFileIo::default().safe_read(path)
}

pub fn safe_write(path: impl AsRef<Path>, content: &str) -> bool {
    SafeFileIo::default().safe_write(path, content)
}

pub fn safe_remove(path: impl AsRef<Path>) -> bool {
    SafeFileIo::default().safe_remove(path)
}

pub fn ensure_directory(path: impl AsRef<Path>) -> bool {
    SafeFileIo::default().ensure_directory(path)
}

pub fn create_temp_file(suffix: &str, prefix: &str) -> AppResult<PathBuf> {
    SafeFileIo::default().create_temp_file(suffix, prefix)
}
