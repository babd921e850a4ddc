/// Assertion helpers over handler history

use anyhow::Result;
use faultline::error::{ErrorHandler, Severity};

/// Assert the handler history holds exactly these contexts, oldest first
pub fn assert_history_contexts(handler: &ErrorHandler, expected: &[&str]) -> Result<()> {
    let contexts: Vec<String> = handler
        .recent_errors(usize::MAX, None)
        .into_iter()
        .map(|r| r.context)
        .collect();

    anyhow::ensure!(
        contexts == expected,
        "history mismatch: expected {:?}, got {:?}",
        expected,
        contexts
    );
    Ok(())
}

/// Assert the newest record has the given severity and recoverable flag
pub fn assert_last_record(
    handler: &ErrorHandler,
    severity: Severity,
    recoverable: bool,
) -> Result<()> {
    let records = handler.recent_errors(1, None);
    let last = records
        .last()
        .ok_or_else(|| anyhow::anyhow!("history is empty"))?;

    anyhow::ensure!(
        last.severity == severity && last.recoverable == recoverable,
        "last record was {:?} (recoverable: {}), expected {:?} (recoverable: {})",
        last.severity,
        last.recoverable,
        severity,
        recoverable
    );
    Ok(())
}
