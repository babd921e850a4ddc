/// Error handling system for faultline
///
/// This module provides the centralized error facility including:
/// - Severity scale and error taxonomy
/// - Immutable, bounded error history
/// - Pluggable notification, logging and state-persistence collaborators
/// - Callback registry for error observers
/// - Scoped error contexts for wrapping units of work
/// - Retry policy with exponential backoff
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────┐
/// │   ErrorScope (wraps a unit of work)       │
/// └────────────────┬─────────────────────────┘
///                  ↓
/// ┌──────────────────────────────────────────┐
/// │   ErrorHandler::handle                    │
/// │   record → log → notify → callbacks       │
/// │   → emergency save (unrecoverable only)   │
/// └──────┬──────────────┬─────────────┬──────┘
///        ↓              ↓             ↓
///   ┌─────────┐   ┌──────────┐  ┌────────────┐
///   │ LogSink │   │ Notifier │  │ StateStore │
///   └─────────┘   └──────────┘  └────────────┘
/// ```
///
/// # Usage Example
///
/// ```rust,ignore
/// use faultline::error::{ErrorHandler, HandleOptions, Severity};
/// use faultline::HandlerConfig;
/// use std::sync::Arc;
///
/// let handler = Arc::new(ErrorHandler::new(&HandlerConfig::default()));
///
/// if let Err(e) = save_conversation() {
///     handler.handle(
///         &e,
///         HandleOptions::new(Severity::Error)
///             .with_context("File operation")
///             .with_user_message("Failed to save file"),
///     );
/// }
/// ```

pub mod classification;
pub mod collaborators;
pub mod handler;
pub mod record;
pub mod retry;
pub mod scope;


// Re-export main types for convenience
pub use classification::{classify, is_transient_io_error, ErrorKind, Severity};
pub use collaborators::{LogSink, Notifier, StateStore};
pub use handler::{ErrorCallback, ErrorHandler, HandleOptions, DEFAULT_MAX_HISTORY};
pub use record::{ErrorRecord, UNKNOWN_CONTEXT};
pub use retry::{RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper};
pub use scope::ErrorScope;
