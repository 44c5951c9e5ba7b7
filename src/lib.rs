// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builder;      // step registration + chain resolution
pub mod config;       // engine configuration
pub mod declaration;  // produce/consume declarations and flags
pub mod engine;       // parallel execution of built chains
pub mod errors;       // error handling
pub mod item;         // typed item identifiers
pub mod observability;
pub mod traits;       // build step abstraction

pub use builder::{ChainBuilder, StepBuilder};
pub use engine::{BuildResult, Chain, StepContext};
pub use item::{BuildItem, ItemId, ItemKind};
pub use traits::{step_fn, BuildStep};
