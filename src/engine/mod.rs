// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Parallel execution of a built chain.
//!
//! # Scheduling
//!
//! A run starts by submitting every start step (no dependencies) to the
//! tokio runtime. When a step finishes it releases each dependent by one;
//! the release that drops a dependent's count to zero submits it. Steps with
//! no dependents count down the run's end-step counter, and the run completes
//! when that counter reaches zero.
//!
//! Independent steps run concurrently on the runtime's worker threads; the
//! only ordering guarantee is that a step starts after all of its
//! dependencies have finished.
//!
//! # Failures
//!
//! A step that returns an error or panics records an ERROR diagnostic.
//! Scheduling continues regardless, and the [`BuildResult`] reports failure
//! once every step has been released. See
//! [`FailureStrategy`](crate::errors::FailureStrategy) for whether steps that
//! become ready afterwards are still invoked.

mod chain;
mod context;
mod diagnostic;
mod execution;
mod result;
mod step_info;
mod values;


pub use chain::Chain;
pub use context::StepContext;
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use execution::ExecutionBuilder;
pub use result::{BuildResult, ExecutionHandle};
pub use step_info::StepInfo;
