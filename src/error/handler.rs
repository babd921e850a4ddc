/// Centralized error handler
///
/// Single entry point through which every caught failure is reported. Each
/// `handle()` call:
/// - Records the failure in a bounded, ordered history
/// - Writes a structured log line (plus source chain and backtrace for errors)
/// - Surfaces a severity-appropriate notification to the user
/// - Invokes registered callbacks
/// - For unrecoverable failures, saves application state and raises a blocking alert
///
/// Every one of those steps is isolated: a failing or panicking collaborator is
/// logged and skipped, so `handle()` itself never fails.
use super::classification::Severity;
use super::collaborators::{LogSink, Notifier, StateStore};
use super::record::ErrorRecord;
use crate::config::HandlerConfig;
use std::any::Any;
use std::backtrace::Backtrace;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default history capacity
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Observer invoked with every handled record. Identity is the `Arc` allocation.
pub type ErrorCallback = Arc<dyn Fn(&ErrorRecord) + Send + Sync>;

/// Per-call parameters for [`ErrorHandler::handle`]
#[derive(Debug, Clone, PartialEq)]
pub struct HandleOptions {
    pub severity: Severity,
    pub context: Option<String>,
    pub user_message: Option<String>,
    pub recoverable: bool,

    /// `None` = decide from severity and the suppression flag
    pub show_dialog: Option<bool>,

    pub log_traceback: bool,
}

impl HandleOptions {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    pub fn with_show_dialog(mut self, show: bool) -> Self {
        self.show_dialog = Some(show);
        self
    }

    pub fn with_log_traceback(mut self, log_traceback: bool) -> Self {
        self.log_traceback = log_traceback;
        self
    }
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
            context: None,
            user_message: None,
            recoverable: true,
            show_dialog: None,
            log_traceback: true,
        }
    }
}

/// Mutable state shared by all threads reporting through one handler
struct HandlerState {
    history: VecDeque<ErrorRecord>,
    callbacks: Vec<ErrorCallback>,
    suppress_dialogs: bool,
}

pub struct ErrorHandler {
    state: Mutex<HandlerState>,
    max_history: usize,
    notifier: Option<Arc<dyn Notifier>>,
    log_sink: Option<Arc<dyn LogSink>>,
    state_stores: Vec<Arc<dyn StateStore>>,
}

impl ErrorHandler {
    /// Create a handler with no collaborators attached
    pub fn new(config: &HandlerConfig) -> Self {
        let max_history = config.max_history.max(1);
        Self {
            state: Mutex::new(HandlerState {
                history: VecDeque::with_capacity(max_history),
                callbacks: Vec::new(),
                suppress_dialogs: config.suppress_dialogs,
            }),
            max_history,
            notifier: None,
            log_sink: None,
            state_stores: Vec::new(),
        }
    }

    /// Attach the user notification surface
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Attach the application debug log
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Add a store to persist when an unrecoverable error is handled
    pub fn with_state_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.state_stores.push(store);
        self
    }

    /// Handle an error with logging, history, notification and callbacks.
    ///
    /// Returns `false` when the error was unrecoverable, `true` otherwise.
    pub fn handle(&self, error: &anyhow::Error, options: HandleOptions) -> bool {
        let record = ErrorRecord::new(
            error,
            options.severity,
            options.context.as_deref(),
            options.user_message.as_deref(),
            options.recoverable,
        );

        let (callbacks, suppressed) = {
            let mut state = self.lock();
            state.history.push_back(record.clone());
            while state.history.len() > self.max_history {
                state.history.pop_front();
            }
            (state.callbacks.clone(), state.suppress_dialogs)
        };

        self.log_error(&record, error, options.log_traceback);

        let show_dialog = options
            .show_dialog
            .unwrap_or(options.severity >= Severity::Warning && !suppressed);
        if show_dialog {
            if let Some(message) = &record.user_message {
                self.notify_user(message, options.severity);
            }
        }

        for callback in &callbacks {
            isolated("error callback", || {
                callback(&record);
                Ok(())
            });
        }

        if !options.recoverable {
            self.handle_unrecoverable(&record);
            return false;
        }

        true
    }

    /// `handle` with default options (Error severity, recoverable)
    pub fn report(&self, error: &anyhow::Error) -> bool {
        self.handle(error, HandleOptions::default())
    }

    fn log_error(&self, record: &ErrorRecord, error: &anyhow::Error, log_traceback: bool) {
        let line = record.log_line();
        let traceback = (log_traceback && record.severity >= Severity::Error).then(|| {
            format!(
                "Traceback:\n{:?}\n\nHandled at:\n{}",
                error,
                Backtrace::force_capture()
            )
        });

        if let Some(sink) = &self.log_sink {
            let written = isolated("log sink", || {
                sink.log(&line)?;
                if let Some(traceback) = &traceback {
                    sink.log(traceback)?;
                }
                Ok(())
            });
            if written {
                return;
            }
        }

        emit_event(record, &line, traceback.as_deref());
    }

    fn notify_user(&self, message: &str, severity: Severity) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        isolated("user notification", || match severity {
            Severity::Critical => notifier.alert(message),
            Severity::Error | Severity::Warning => {
                let prefix = severity.status_prefix().unwrap_or("Error");
                notifier.status(&format!("{}: {}", prefix, message))
            }
            Severity::Info | Severity::Debug => Ok(()),
        });
    }

    fn handle_unrecoverable(&self, record: &ErrorRecord) {
        tracing::error!(
            critical = true,
            id = %record.id,
            context = %record.context,
            "CRITICAL ERROR in {}: {}",
            record.context,
            record.message
        );

        let saved = self.save_emergency_state();
        tracing::info!(
            saved,
            total = self.state_stores.len(),
            "Emergency state save finished"
        );

        // Ignores the suppression flag
        if let Some(notifier) = &self.notifier {
            let alert = format!(
                "Critical error: {}\n\nThe application may need to restart.\nPlease check the logs for details.",
                record.message
            );
            isolated("critical alert", || notifier.alert(&alert));
        }
    }

    /// Save every attached store once; returns how many succeeded
    fn save_emergency_state(&self) -> usize {
        self.state_stores
            .iter()
            .filter(|store| isolated("emergency state save", || store.save()))
            .count()
    }

    /// Register a callback; registering the same `Arc` twice is a no-op
    pub fn register_callback(&self, callback: ErrorCallback) {
        let mut state = self.lock();
        if !state
            .callbacks
            .iter()
            .any(|existing| same_callback(existing, &callback))
        {
            state.callbacks.push(callback);
        }
    }

    /// Remove a callback; unknown callbacks are ignored
    pub fn unregister_callback(&self, callback: &ErrorCallback) {
        self.lock()
            .callbacks
            .retain(|existing| !same_callback(existing, callback));
    }

    /// Number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.lock().callbacks.len()
    }

    /// Most recent `count` records (oldest first), optionally only one severity
    pub fn recent_errors(&self, count: usize, severity: Option<Severity>) -> Vec<ErrorRecord> {
        let state = self.lock();
        let matching: Vec<&ErrorRecord> = state
            .history
            .iter()
            .filter(|record| severity.map_or(true, |s| record.severity == s))
            .collect();

        let skip = matching.len().saturating_sub(count);
        matching.into_iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Disable (or re-enable) automatic notifications for every severity
    pub fn set_suppress_dialogs(&self, suppress: bool) {
        self.lock().suppress_dialogs = suppress;
    }

    pub fn dialogs_suppressed(&self) -> bool {
        self.lock().suppress_dialogs
    }

    /// Write the current history to `path` as pretty JSON.
    ///
    /// Best-effort like the rest of the safe I/O layer: returns `false` on any failure.
    pub fn export_history(&self, path: impl AsRef<Path>) -> bool {
        let records: Vec<ErrorRecord> = self.lock().history.iter().cloned().collect();
        match serde_json::to_string_pretty(&records) {
            Ok(json) => crate::io::safe_write(path, &json),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize error history");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandlerState> {
        // Poisoning is ignored; every update leaves the state consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(&HandlerConfig::default())
    }
}

fn same_callback(a: &ErrorCallback, b: &ErrorCallback) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Run one handling step, containing both `Err` and panics. Returns whether it succeeded.
pub(crate) fn isolated<F>(step: &str, f: F) -> bool
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(step, error = %format!("{:#}", e), "Error handling step failed");
            false
        }
        Err(payload) => {
            tracing::warn!(
                step,
                panic = %panic_message(payload.as_ref()),
                "Error handling step panicked"
            );
            false
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn emit_event(record: &ErrorRecord, line: &str, traceback: Option<&str>) {
    let traceback = traceback.unwrap_or_default();
    match record.severity {
        Severity::Debug => tracing::debug!(id = %record.id, kind = %record.kind, "{}", line),
        Severity::Info => tracing::info!(id = %record.id, kind = %record.kind, "{}", line),
        Severity::Warning => tracing::warn!(id = %record.id, kind = %record.kind, "{}", line),
        Severity::Error => {
            tracing::error!(id = %record.id, kind = %record.kind, "{}", line);
            if !traceback.is_empty() {
                tracing::error!(id = %record.id, "{}", traceback);
            }
        }
        Severity::Critical => {
            tracing::error!(id = %record.id, kind = %record.kind, critical = true, "{}", line);
            if !traceback.is_empty() {
                tracing::error!(id = %record.id, critical = true, "{}", traceback);
            }
        }
    }
}
