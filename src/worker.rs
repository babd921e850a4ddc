/// Background worker
///
/// Runs one long unit of work on a dedicated blocking thread and streams its
/// progress to the owner over a channel. Failures (including panics) are
/// reported to the shared [`ErrorHandler`] and surfaced as a `Failed` signal;
/// they never reach the owner's thread as a panic.
use crate::error::{classify, ErrorHandler, ErrorKind, HandleOptions, Severity};
use crate::error::handler::panic_message;
use crate::AppError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Context used for I/O-class worker failures
pub const WORKER_CONTEXT: &str = "Worker execution";

/// Context used for any other worker failure
pub const WORKER_UNEXPECTED_CONTEXT: &str = "Worker execution - unexpected error";

/// Signal emitted by a running worker
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerSignal<T> {
    /// Intermediate progress
    Updated(T),

    /// Task completed with a result
    Finished(T),

    /// Task failed; the failure has already been reported to the error handler
    Failed(String),
}

/// Handed to the task so it can report progress
pub struct WorkerContext<T> {
    tx: UnboundedSender<WorkerSignal<T>>,
}

impl<T> WorkerContext<T> {
    /// Emit an `Updated` signal. Ignored if the owner stopped listening.
    pub fn update(&self, value: T) {
        let _ = self.tx.send(WorkerSignal::Updated(value));
    }

    /// Whether the owner is still listening
    pub fn is_observed(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Owner's side of a spawned worker
pub struct WorkerHandle<T> {
    signals: UnboundedReceiver<WorkerSignal<T>>,
    join: JoinHandle<()>,
}

impl<T> WorkerHandle<T> {
    /// Next signal, or `None` once the worker has exited and all signals were drained
    pub async fn next_signal(&mut self) -> Option<WorkerSignal<T>> {
        self.signals.recv().await
    }

    /// Drain signals until the task finishes, returning its result
    pub async fn finished(mut self) -> Result<T, String> {
        while let Some(signal) = self.signals.recv().await {
            match signal {
                WorkerSignal::Updated(_) => continue,
                WorkerSignal::Finished(value) => return Ok(value),
                WorkerSignal::Failed(message) => return Err(message),
            }
        }

        match self.join.await {
            Ok(()) => Err("worker exited without a result".to_string()),
            Err(e) => Err(format!("worker thread failed: {}", e)),
        }
    }

    /// Abort waiting on the worker. The blocking thread itself runs to completion.
    pub fn detach(self) {
        drop(self.signals);
    }
}

/// Spawn `task` on the blocking thread pool of the current tokio runtime.
///
/// Must be called from within a runtime.
pub fn spawn<T, F>(handler: Arc<ErrorHandler>, task: F) -> WorkerHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&WorkerContext<T>) -> anyhow::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let join = tokio::task::spawn_blocking(move || run(&handler, task, tx));
    WorkerHandle { signals: rx, join }
}

fn run<T, F>(handler: &ErrorHandler, task: F, tx: UnboundedSender<WorkerSignal<T>>)
where
    F: FnOnce(&WorkerContext<T>) -> anyhow::Result<T>,
{
    let ctx = WorkerContext { tx: tx.clone() };

    let error = match panic::catch_unwind(AssertUnwindSafe(|| task(&ctx))) {
        Ok(Ok(value)) => {
            let _ = tx.send(WorkerSignal::Finished(value));
            return;
        }
        Ok(Err(e)) => e,
        Err(payload) => anyhow::Error::new(AppError::Panicked(panic_message(payload.as_ref()))),
    };

    let context = match classify(&error).0 {
        ErrorKind::Io | ErrorKind::FileOperation => WORKER_CONTEXT,
        _ => WORKER_UNEXPECTED_CONTEXT,
    };
    tracing::debug!(context, error = %error, "Worker task failed");

    handler.handle(
        &error,
        HandleOptions::new(Severity::Error)
            .with_context(context)
            .with_recoverable(true)
            .with_show_dialog(false),
    );
    let _ = tx.send(WorkerSignal::Failed(error.to_string()));
}
