// Allow complex types where needed for callback registries and collaborator sets
#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod io;
pub mod ui;
pub mod worker;

// Re-export the main entry points for convenience
pub use config::{HandlerConfig, IoConfig, Settings};
pub use error::{
    ErrorHandler, ErrorKind, ErrorRecord, ErrorScope, HandleOptions, RetryPolicy, Severity,
};
pub use io::{FileOperationError, OpenMode, SafeFileIo, ScopedFile};

use thiserror::Error;

/// Application error taxonomy.
///
/// Every variant maps to one [`ErrorKind`] tag so callers can match broadly
/// (any `AppError`) or narrowly (a single variant).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error(transparent)]
    FileOperation(#[from] FileOperationError),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Indexing error: {0}")]
    Indexing(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation panicked: {0}")]
    Panicked(String),
}

impl AppError {
    /// Taxonomy tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Provider(_) => ErrorKind::Provider,
            AppError::Audio(_) => ErrorKind::Audio,
            AppError::Camera(_) => ErrorKind::Camera,
            AppError::FileOperation(_) => ErrorKind::FileOperation,
            AppError::Plugin(_) => ErrorKind::Plugin,
            AppError::Model(_) => ErrorKind::Model,
            AppError::Indexing(_) => ErrorKind::Indexing,
            AppError::Network(_) => ErrorKind::Network,
            AppError::Io(_) => ErrorKind::Io,
            AppError::Panicked(_) => ErrorKind::Panic,
        }
    }

    /// Short type name used in log lines (`[ERROR] context: <name>: message`)
    pub fn type_name(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "ConfigurationError",
            AppError::Provider(_) => "ProviderError",
            AppError::Audio(_) => "AudioError",
            AppError::Camera(_) => "CameraError",
            AppError::FileOperation(_) => "FileOperationError",
            AppError::Plugin(_) => "PluginError",
            AppError::Model(_) => "ModelError",
            AppError::Indexing(_) => "IndexingError",
            AppError::Network(_) => "NetworkError",
            AppError::Io(_) => "IoError",
            AppError::Panicked(_) => "Panic",
        }
    }
}

// Manual Clone implementation because std::io::Error doesn't implement Clone
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Configuration(s) => AppError::Configuration(s.clone()),
            AppError::Provider(s) => AppError::Provider(s.clone()),
            AppError::Audio(s) => AppError::Audio(s.clone()),
            AppError::Camera(s) => AppError::Camera(s.clone()),
            AppError::FileOperation(e) => AppError::FileOperation(e.clone()),
            AppError::Plugin(s) => AppError::Plugin(s.clone()),
            AppError::Model(s) => AppError::Model(s.clone()),
            AppError::Indexing(s) => AppError::Indexing(s.clone()),
            AppError::Network(s) => AppError::Network(s.clone()),
            AppError::Io(e) => AppError::Io(std::io::Error::new(e.kind(), e.to_string())),
            AppError::Panicked(s) => AppError::Panicked(s.clone()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod lib_tests;
