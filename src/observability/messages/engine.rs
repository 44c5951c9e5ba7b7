// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain execution events.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion, failure)
//! * Build step invocation and outcome
//! * Diagnostics recorded by steps

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::engine::{Diagnostic, DiagnosticLevel};
use crate::observability::messages::StructuredLog;

/// A run of a chain started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use buildchain::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     build_target_name: "release",
///     step_count: 8,
///     start_steps: 2,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting execution of 'release': 8 steps, 2 ready"
/// );
/// ```
pub struct ExecutionStarted<'a> {
    pub build_target_name: &'a str,
    pub step_count: usize,
    pub start_steps: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting execution of '{}': {} steps, {} ready",
            self.build_target_name, self.step_count, self.start_steps
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            build_target_name = self.build_target_name,
            step_count = self.step_count,
            start_steps = self.start_steps,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            build_target_name = self.build_target_name,
            step_count = self.step_count,
        )
    }
}

/// Every step finished and no error was recorded.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub build_target_name: &'a str,
    pub step_count: usize,
    pub diagnostic_count: usize,
    pub duration: Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution of '{}' completed: {} steps in {:?} ({} diagnostics)",
            self.build_target_name, self.step_count, self.duration, self.diagnostic_count
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            build_target_name = self.build_target_name,
            step_count = self.step_count,
            diagnostic_count = self.diagnostic_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            build_target_name = self.build_target_name,
            duration = ?self.duration,
        )
    }
}

/// Every step finished but at least one error was recorded.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ExecutionFailed<'a> {
    pub build_target_name: &'a str,
    pub error_count: usize,
    pub duration: Duration,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution of '{}' failed with {} errors after {:?}",
            self.build_target_name, self.error_count, self.duration
        )
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            build_target_name = self.build_target_name,
            error_count = self.error_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "execution_failed",
            span_name = name,
            build_target_name = self.build_target_name,
            error_count = self.error_count,
        )
    }
}

/// A build step was invoked.
///
/// # Log Level
/// `debug!` - Per-step activity
pub struct StepStarted<'a> {
    pub step_id: &'a str,
    pub build_target_name: &'a str,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Running build step '{}'", self.step_id)
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            step_id = self.step_id,
            build_target_name = self.build_target_name,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "build_step",
            span_name = name,
            step_id = self.step_id,
            build_target_name = self.build_target_name,
        )
    }
}

/// A build step returned successfully.
///
/// # Log Level
/// `debug!` - Per-step activity
pub struct StepCompleted<'a> {
    pub step_id: &'a str,
    pub duration: Duration,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Build step '{}' completed in {:?}", self.step_id, self.duration)
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            step_id = self.step_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "build_step_completed",
            span_name = name,
            step_id = self.step_id,
            duration = ?self.duration,
        )
    }
}

/// A build step returned an error or panicked.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StepFailed<'a> {
    pub step_id: &'a str,
    pub error: &'a str,
}

impl Display for StepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Build step '{}' failed: {}", self.step_id, self.error)
    }
}

impl StructuredLog for StepFailed<'_> {
    fn log(&self) {
        tracing::error!(step_id = self.step_id, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "build_step_failed",
            span_name = name,
            step_id = self.step_id,
            error = self.error,
        )
    }
}

/// A ready step was not invoked because the run already recorded an error.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct StepSkipped<'a> {
    pub step_id: &'a str,
}

impl Display for StepSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping build step '{}': an earlier step recorded an error",
            self.step_id
        )
    }
}

impl StructuredLog for StepSkipped<'_> {
    fn log(&self) {
        tracing::warn!(step_id = self.step_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("build_step_skipped", span_name = name, step_id = self.step_id)
    }
}

/// A step recorded a diagnostic; logged at the diagnostic's own level.
pub struct DiagnosticRecorded<'a> {
    pub diagnostic: &'a Diagnostic,
}

impl Display for DiagnosticRecorded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl StructuredLog for DiagnosticRecorded<'_> {
    fn log(&self) {
        let step_id = self.diagnostic.step_id();
        let location = self.diagnostic.location().unwrap_or_default();
        match self.diagnostic.level() {
            DiagnosticLevel::Note => tracing::info!(step_id, location, "{}", self),
            DiagnosticLevel::Warning => tracing::warn!(step_id, location, "{}", self),
            DiagnosticLevel::Error => tracing::error!(step_id, location, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "diagnostic",
            span_name = name,
            step_id = self.diagnostic.step_id(),
            level = %self.diagnostic.level(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_display() {
        let msg = ExecutionFailed {
            build_target_name: "debug",
            error_count: 2,
            duration: Duration::from_millis(5),
        };
        assert_eq!(msg.to_string(), "Execution of 'debug' failed with 2 errors after 5ms");
    }

    #[test]
    fn test_step_skipped_display() {
        let msg = StepSkipped { step_id: "package" };
        assert_eq!(
            msg.to_string(),
            "Skipping build step 'package': an earlier step recorded an error"
        );
    }

    #[test]
    fn test_diagnostic_recorded_uses_diagnostic_text() {
        let diagnostic = Diagnostic::new(DiagnosticLevel::Note, "scan", None, "3 files");
        let msg = DiagnosticRecorded {
            diagnostic: &diagnostic,
        };
        msg.log();
        assert_eq!(msg.to_string(), "[NOTE] scan: 3 files");
    }
}
