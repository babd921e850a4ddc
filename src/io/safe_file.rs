/// Safe file operations with retry logic
///
/// `scoped_open` is the one place retry/backoff lives. The convenience
/// operations built on it (`safe_read`, `safe_write`, ...) never fail to their
/// caller: they convert every failure to a sentinel (`None` / `false`) and log it.
use super::platform::{FileOps, StdFileOps};
use super::{FileOperationError, DEFAULT_TEMP_PREFIX, DEFAULT_TEMP_SUFFIX};
use crate::error::classification::is_transient_io_error;
use crate::error::retry::{RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper};
use crate::{AppError, AppResult};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read only; the file must exist
    Read,
    /// Create or truncate, write only
    Write,
    /// Create if missing, append
    Append,
    /// Read and write an existing file
    ReadWrite,
}

impl OpenMode {
    pub fn is_writable(&self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

impl FromStr for OpenMode {
    type Err = AppError;

    /// Parse `r`, `w`, `a`, `r+`; a `b` flag is accepted and ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != 'b').collect();
        match normalized.as_str() {
            "r" => Ok(OpenMode::Read),
            "w" => Ok(OpenMode::Write),
            "a" => Ok(OpenMode::Append),
            "r+" | "+r" => Ok(OpenMode::ReadWrite),
            _ => Err(AppError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported open mode '{}'", s),
            ))),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Append => "a",
            OpenMode::ReadWrite => "r+",
        };
        f.write_str(mode)
    }
}

/// Open file whose handle is released on every exit path.
///
/// Dereferences to [`File`]. Dropping it closes the file; use [`ScopedFile::close`]
/// to flush to disk and observe the result instead.
#[derive(Debug)]
pub struct ScopedFile {
    file: Option<File>,
    path: PathBuf,
    mode: OpenMode,
}

impl ScopedFile {
    fn new(file: File, path: PathBuf, mode: OpenMode) -> Self {
        Self {
            file: Some(file),
            path,
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Sync written data to disk and close
    pub fn close(mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) if self.mode.is_writable() => file.sync_all(),
            _ => Ok(()),
        }
    }
}

impl Deref for ScopedFile {
    type Target = File;

    fn deref(&self) -> &File {
        // Only `close` and `drop` take the file, both consume the handle
        self.file.as_ref().expect("scoped file used after close")
    }
}

impl DerefMut for ScopedFile {
    fn deref_mut(&mut self) -> &mut File {
        self.file.as_mut().expect("scoped file used after close")
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            if self.mode.is_writable() {
                if let Err(e) = file.flush() {
                    tracing::debug!(path = %self.path.display(), error = %e, "Flush on close failed");
                }
            }
        }
    }
}

/// Retrying file I/O
#[derive(Clone)]
pub struct SafeFileIo {
    policy: RetryPolicy,
    ops: Arc<dyn FileOps>,
    sleeper: Arc<dyn Sleeper>,
}

impl SafeFileIo {
    /// Create over the real filesystem with the given retry policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            ops: Arc::new(StdFileOps),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the filesystem backend
    pub fn with_file_ops(mut self, ops: Arc<dyn FileOps>) -> Self {
        self.ops = ops;
        self
    }

    /// Replace how the retry loop waits between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Open `path`, retrying transient failures with exponential backoff.
    ///
    /// Non-transient failures return [`AppError::Io`] immediately; exhausting
    /// all attempts returns [`AppError::FileOperation`].
    pub fn scoped_open(&self, path: impl AsRef<Path>, mode: OpenMode) -> AppResult<ScopedFile> {
        let path = path.as_ref();
        let outcome = self.policy.run(
            self.sleeper.as_ref(),
            is_transient_io_error,
            |_attempt| self.ops.open(path, mode),
        );

        match outcome {
            RetryOutcome::Succeeded(file) => Ok(ScopedFile::new(file, path.to_path_buf(), mode)),
            RetryOutcome::Fatal(e) => Err(AppError::Io(e)),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::warn!(
                    path = %path.display(),
                    attempts,
                    platform = self.ops.platform_name(),
                    error = %last_error,
                    "Giving up on file open"
                );
                Err(FileOperationError {
                    path: path.to_path_buf(),
                    attempts,
                    source: last_error,
                }
                .into())
            }
        }
    }

    /// Read a UTF-8 text file; `None` on any failure
    pub fn safe_read(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        let result = self.scoped_open(path, OpenMode::Read).and_then(|mut file| {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(content)
        });
        sentinel(path, "read", result)
    }

    /// Read a file's raw bytes; `None` on any failure
    pub fn safe_read_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = path.as_ref();
        let result = self.scoped_open(path, OpenMode::Read).and_then(|mut file| {
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            Ok(content)
        });
        sentinel(path, "read", result)
    }

    /// Write text, replacing any existing content; `false` on any failure
    pub fn safe_write(&self, path: impl AsRef<Path>, content: &str) -> bool {
        self.safe_write_bytes(path, content.as_bytes())
    }

    /// Write raw bytes, replacing any existing content; `false` on any failure
    pub fn safe_write_bytes(&self, path: impl AsRef<Path>, content: &[u8]) -> bool {
        let path = path.as_ref();
        let result = self.scoped_open(path, OpenMode::Write).and_then(|mut file| {
            file.write_all(content)?;
            Ok(())
        });
        sentinel(path, "write", result).is_some()
    }

    /// Remove a file. `true` if it is gone afterwards (including when it never existed).
    pub fn safe_remove(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !self.ops.exists(path) {
            return true;
        }

        let outcome = self.policy.run(
            self.sleeper.as_ref(),
            is_transient_io_error,
            |_attempt| self.ops.remove_file(path),
        );

        match outcome {
            RetryOutcome::Succeeded(()) => true,
            // Removed by someone else between the check and the call
            RetryOutcome::Fatal(e) if e.kind() == io::ErrorKind::NotFound => true,
            RetryOutcome::Fatal(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Remove failed");
                false
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::debug!(
                    path = %path.display(),
                    attempts,
                    error = %last_error,
                    "Remove failed after retries"
                );
                false
            }
        }
    }

    /// Create a directory and its parents; `false` on failure
    pub fn ensure_directory(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match fs::create_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot create directory");
                false
            }
        }
    }

    /// Allocate a uniquely named file in the system temp directory.
    ///
    /// The handle is closed before returning, so the path is not held open.
    /// The file is not deleted automatically.
    pub fn create_temp_file(&self, suffix: &str, prefix: &str) -> AppResult<PathBuf> {
        self.create_temp_file_in(std::env::temp_dir(), suffix, prefix)
    }

    /// [`SafeFileIo::create_temp_file`] in a specific directory
    pub fn create_temp_file_in(
        &self,
        dir: impl AsRef<Path>,
        suffix: &str,
        prefix: &str,
    ) -> AppResult<PathBuf> {
        let temp = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        let (file, path) = temp.keep().map_err(|e| AppError::Io(e.error))?;
        drop(file);
        Ok(path)
    }

    /// Temp file with the default audio prefix/suffix (`app_audio_*.mp3`)
    pub fn create_temp_audio_file(&self) -> AppResult<PathBuf> {
        self.create_temp_file(DEFAULT_TEMP_SUFFIX, DEFAULT_TEMP_PREFIX)
    }
}

impl Default for SafeFileIo {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl fmt::Debug for SafeFileIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeFileIo")
            .field("policy", &self.policy)
            .field("platform", &self.ops.platform_name())
            .finish()
    }
}

fn sentinel<T>(path: &Path, operation: &str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(path = %path.display(), operation, error = %e, "Safe file operation failed");
            None
        }
    }
}
