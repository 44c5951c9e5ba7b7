// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use thiserror::Error;

/// How a run treats steps that become ready after a step has failed.
///
/// Neither strategy cancels running steps or skips dependency bookkeeping:
/// every step is always released exactly once so the run drains completely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Every step runs; failures are collected as diagnostics.
    #[default]
    ContinueOnError,
    /// Steps that start after an error was recorded are not invoked.
    SkipAfterError,
}

/// A run ended without reporting a result.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The run state was dropped before the last end step finished, for
    /// example because the executing runtime shut down.
    #[error("Execution of '{build_target_name}' was abandoned before completion")]
    Abandoned { build_target_name: String },
}
