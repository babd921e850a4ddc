use super::OpenMode;
use std::fs::{self, File, OpenOptions};
use std::io::Result as IOResult;
use std::path::Path;

/// Filesystem primitives used by the safe I/O layer.
///
/// The retry logic only ever talks to the filesystem through this trait, which
/// lets alternative backends (or tests) inject locking and permission failures.
pub trait FileOps: Send + Sync {
    /// Open a file in the given mode
    fn open(&self, path: &Path, mode: OpenMode) -> IOResult<File>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> IOResult<()>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Platform name for logging
    fn platform_name(&self) -> &str;
}

/// Operating system filesystem via `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn open(&self, path: &Path, mode: OpenMode) -> IOResult<File> {
        let mut opts = OpenOptions::new();
        match mode {
            OpenMode::Read => opts.read(true),
            OpenMode::Write => opts.write(true).create(true).truncate(true),
            OpenMode::Append => opts.append(true).create(true),
            OpenMode::ReadWrite => opts.read(true).write(true),
        };
        opts.open(path)
    }

    fn remove_file(&self, path: &Path) -> IOResult<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling symlink still counts as present
        fs::symlink_metadata(path).is_ok()
    }

    fn platform_name(&self) -> &str {
        if cfg!(target_os = "linux") {
            "Linux"
        } else if cfg!(target_os = "windows") {
            "Windows"
        } else if cfg!(target_os = "macos") {
            "macOS"
        } else {
            "Generic"
        }
    }
}
