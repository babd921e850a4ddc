/// Error classification for handling and retry decisions
///
/// This module defines the ordered severity scale used for threshold checks,
/// the taxonomy tags attached to every handled error, and the classifier that
/// decides whether an OS-level I/O failure is transient (worth retrying) or not.
use crate::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Severity of a handled error, totally ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Debug information, never shown to users
    Debug = 1,

    /// Informational messages
    Info = 2,

    /// Operation continues, user may be told
    Warning = 3,

    /// Operation may have failed
    Error = 4,

    /// Application may need to restart
    Critical = 5,
}

impl Severity {
    /// Upper-case label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Prefix prepended to status-line notifications, if this severity uses the status line
    pub fn status_prefix(&self) -> Option<&'static str> {
        match self {
            Severity::Error => Some("Error"),
            Severity::Warning => Some("Warning"),
            _ => None,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Taxonomy tag of a handled error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    Provider,
    Audio,
    Camera,
    FileOperation,
    Plugin,
    Model,
    Indexing,
    Network,

    /// Bare OS-level I/O failure not wrapped by a caller
    Io,

    /// Panic captured while running a scoped unit of work
    Panic,

    /// Anything outside the application taxonomy
    Other,
}

impl ErrorKind {
    /// Get human-readable description of the error kind
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "Missing, invalid or corrupt configuration",
            ErrorKind::Provider => "External provider or API failure",
            ErrorKind::Audio => "Audio input/output failure",
            ErrorKind::Camera => "Camera or frame capture failure",
            ErrorKind::FileOperation => "File operation failed after retries",
            ErrorKind::Plugin => "Plugin initialization or execution failure",
            ErrorKind::Model => "Model loading or inference failure",
            ErrorKind::Indexing => "Document indexing or vector store failure",
            ErrorKind::Network => "Network connectivity failure",
            ErrorKind::Io => "Operating system I/O failure",
            ErrorKind::Panic => "Unexpected panic",
            ErrorKind::Other => "Unclassified failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Provider => "Provider",
            ErrorKind::Audio => "Audio",
            ErrorKind::Camera => "Camera",
            ErrorKind::FileOperation => "FileOperation",
            ErrorKind::Plugin => "Plugin",
            ErrorKind::Model => "Model",
            ErrorKind::Indexing => "Indexing",
            ErrorKind::Network => "Network",
            ErrorKind::Io => "Io",
            ErrorKind::Panic => "Panic",
            ErrorKind::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Classify an arbitrary error into its taxonomy tag and a short type name.
///
/// The first [`AppError`] found in the source chain wins; a bare
/// `std::io::Error` becomes [`ErrorKind::Io`].
pub fn classify(error: &anyhow::Error) -> (ErrorKind, &'static str) {
    for cause in error.chain() {
        if let Some(app) = cause.downcast_ref::<AppError>() {
            return (app.kind(), app.type_name());
        }
        if cause.downcast_ref::<crate::io::FileOperationError>().is_some() {
            return (ErrorKind::FileOperation, "FileOperationError");
        }
        if cause.downcast_ref::<io::Error>().is_some() {
            return (ErrorKind::Io, "IoError");
        }
    }
    (ErrorKind::Other, "Error")
}

// Windows: ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
#[cfg(windows)]
const WINDOWS_LOCK_ERRORS: [i32; 2] = [32, 33];

/// Whether an I/O failure is a permission or locking condition expected to
/// clear if retried shortly after.
pub fn is_transient_io_error(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::Interrupted => return true,
        _ => {}
    }

    match err.raw_os_error() {
        #[cfg(unix)]
        Some(code) => matches!(code, libc::EBUSY | libc::ETXTBSY | libc::EAGAIN | libc::EACCES),
        #[cfg(windows)]
        Some(code) => WINDOWS_LOCK_ERRORS.contains(&code),
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}
