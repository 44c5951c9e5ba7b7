// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Two-phase construction of a build chain.
//!
//! Callers register steps on a [`ChainBuilder`], describe what each step
//! produces and consumes through the returned [`StepBuilder`], declare the
//! initial and final items, and call [`ChainBuilder::build`] to resolve the
//! declarations into an immutable [`Chain`](crate::engine::Chain).

mod chain_builder;
mod graph_output;
mod location;
mod step_builder;

pub use chain_builder::ChainBuilder;
pub use graph_output::{render_dot, write_graph};
pub use location::{StepIndex, StepLocation};
pub use step_builder::StepBuilder;
