/// Scoped error context
///
/// Wraps a unit of work so that any failure raised inside is reported through
/// [`ErrorHandler::handle`] with a fixed context, user message, severity and
/// recoverable flag. Recoverable failures are swallowed (`Ok(None)`), the rest
/// are returned to the caller after being reported. A panic is reported too and
/// then resumed.
use super::classification::Severity;
use super::handler::{panic_message, ErrorHandler, HandleOptions};
use crate::AppError;
use std::panic::{self, AssertUnwindSafe};

pub struct ErrorScope<'a> {
    handler: &'a ErrorHandler,
    context: String,
    user_message: String,
    severity: Severity,
    recoverable: bool,
}

impl<'a> ErrorScope<'a> {
    /// New scope reporting at Error severity, recoverable
    pub fn new(
        handler: &'a ErrorHandler,
        context: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            handler,
            context: context.into(),
            user_message: user_message.into(),
            severity: Severity::Error,
            recoverable: true,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    fn options(&self) -> HandleOptions {
        HandleOptions::new(self.severity)
            .with_context(self.context.clone())
            .with_user_message(self.user_message.clone())
            .with_recoverable(self.recoverable)
    }

    /// Run `operation`, reporting any failure.
    ///
    /// - `Ok(v)` → `Ok(Some(v))`
    /// - `Err(e)`, recoverable → reported, `Ok(None)`
    /// - `Err(e)`, unrecoverable → reported, `Err(e)`
    /// - panic → reported as [`AppError::Panicked`], then resumed
    pub fn run<T, E, F>(&self, operation: F) -> anyhow::Result<Option<T>>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<anyhow::Error>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(operation)) {
            Ok(result) => result,
            Err(payload) => {
                let error = anyhow::Error::new(AppError::Panicked(panic_message(payload.as_ref())));
                self.handler.handle(&error, self.options());
                panic::resume_unwind(payload);
            }
        };

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let error = e.into();
                self.handler.handle(&error, self.options());
                if self.recoverable {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }
}
