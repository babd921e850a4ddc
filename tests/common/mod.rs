#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared functionality including:
/// - Recording collaborators (notifier, log sink, state store)
/// - Fault-injecting filesystem backends
/// - Assertion helpers over handler history

pub mod assertions;
pub mod recording;
pub mod test_helpers;
