// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading engine configuration or building the executor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid engine configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("worker_threads must be at least 1")]
    NoWorkers,

    #[error("Failed to start executor runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
