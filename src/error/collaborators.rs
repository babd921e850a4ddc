/// Narrow capability interfaces the error handler depends on
///
/// Each collaborator is injected into [`super::ErrorHandler`] at construction.
/// A missing collaborator is simply `None`; the handler never probes for
/// capabilities at call time.
use anyhow::Result;

/// User-facing notification surface (status line and blocking alert).
///
/// Implementations that touch UI state are responsible for marshaling the
/// request onto their UI thread; the handler only issues it.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show a non-blocking status-line message
    fn status(&self, message: &str) -> Result<()>;

    /// Show a blocking alert
    fn alert(&self, message: &str) -> Result<()>;
}

/// Application debug log
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str) -> Result<()>;
}

/// Persistable application state (conversation store, configuration, ...)
pub trait StateStore: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Persist current state
    fn save(&self) -> Result<()>;
}
