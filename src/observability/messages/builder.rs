// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain resolution events.

use std::fmt::{Display, Formatter};
use std::path::Path;

use tracing::Span;

use crate::errors::ChainBuildError;
use crate::observability::messages::StructuredLog;

/// Chain resolution started.
///
/// # Log Level
/// `debug!` - Routine builder activity
pub struct ChainBuildStarted {
    pub step_count: usize,
    pub initial_count: usize,
    pub final_count: usize,
}

impl Display for ChainBuildStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Building chain from {} registered steps ({} initial items, {} final items)",
            self.step_count, self.initial_count, self.final_count
        )
    }
}

impl StructuredLog for ChainBuildStarted {
    fn log(&self) {
        tracing::debug!(
            step_count = self.step_count,
            initial_count = self.initial_count,
            final_count = self.final_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chain_build",
            span_name = name,
            step_count = self.step_count,
            initial_count = self.initial_count,
            final_count = self.final_count,
        )
    }
}

/// Chain resolved successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use buildchain::observability::messages::builder::ChainBuildCompleted;
///
/// let msg = ChainBuildCompleted {
///     included_steps: 12,
///     start_steps: 3,
///     end_steps: 2,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Chain built with 12 steps (3 start steps, 2 end steps)"
/// );
/// ```
pub struct ChainBuildCompleted {
    pub included_steps: usize,
    pub start_steps: usize,
    pub end_steps: usize,
}

impl Display for ChainBuildCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain built with {} steps ({} start steps, {} end steps)",
            self.included_steps, self.start_steps, self.end_steps
        )
    }
}

impl StructuredLog for ChainBuildCompleted {
    fn log(&self) {
        tracing::info!(
            included_steps = self.included_steps,
            start_steps = self.start_steps,
            end_steps = self.end_steps,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_build_completed",
            span_name = name,
            included_steps = self.included_steps,
            start_steps = self.start_steps,
            end_steps = self.end_steps,
        )
    }
}

/// Chain resolution rejected the declarations.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ChainBuildFailed<'a> {
    pub error: &'a ChainBuildError,
}

impl Display for ChainBuildFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Chain build failed: {}", self.error)
    }
}

impl StructuredLog for ChainBuildFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("chain_build_failed", span_name = name, error = %self.error)
    }
}

/// DOT rendering of the chain written to disk.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphOutputWritten<'a> {
    pub path: &'a Path,
}

impl Display for GraphOutputWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Chain graph written to {}", self.path.display())
    }
}

impl StructuredLog for GraphOutputWritten<'_> {
    fn log(&self) {
        tracing::info!(path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("graph_output", span_name = name, path = %self.path.display())
    }
}

/// DOT rendering could not be written; the build itself still succeeds.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct GraphOutputFailed<'a> {
    pub path: &'a Path,
    pub error: &'a std::io::Error,
}

impl Display for GraphOutputFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to write chain graph to {}: {}",
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for GraphOutputFailed<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "graph_output_failed",
            span_name = name,
            path = %self.path.display(),
            error = %self.error,
        )
    }
}
