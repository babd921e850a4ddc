/// Immutable record of one handled failure
use super::classification::{classify, ErrorKind, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Context label used when the caller did not supply one
pub const UNKNOWN_CONTEXT: &str = "Unknown context";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Unique record identifier (UUID)
    pub id: Uuid,

    /// Taxonomy tag
    pub kind: ErrorKind,

    /// Short name of the concrete failure type
    pub type_name: String,

    pub severity: Severity,

    /// Operation that failed (e.g. "Camera initialization")
    pub context: String,

    /// Optional text for UI surfacing
    pub user_message: Option<String>,

    /// Whether the caller's larger operation may continue
    pub recoverable: bool,

    /// Description of the underlying failure
    pub message: String,

    /// When the failure was handled
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub(crate) fn new(
        error: &anyhow::Error,
        severity: Severity,
        context: Option<&str>,
        user_message: Option<&str>,
        recoverable: bool,
    ) -> Self {
        let (kind, type_name) = classify(error);
        Self {
            id: Uuid::new_v4(),
            kind,
            type_name: type_name.to_string(),
            severity,
            context: context.unwrap_or(UNKNOWN_CONTEXT).to_string(),
            user_message: user_message.map(str::to_string),
            recoverable,
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Structured log line: `[SEVERITY] context: type: message`
    pub fn log_line(&self) -> String {
        format!(
            "[{}] {}: {}: {}",
            self.severity, self.context, self.type_name, self.message
        )
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log_line())
    }
}
