// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod build;
mod config;
mod context;
mod execution;

pub use build::{ChainBuildError, ItemIdError};
pub use config::ConfigError;
pub use context::ContextError;
pub use execution::{ExecutionError, FailureStrategy};
