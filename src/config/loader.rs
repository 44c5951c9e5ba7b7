// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::runtime::{Builder, Runtime};

use crate::config::consts::{DEFAULT_THREAD_NAME, DEFAULT_WORKER_THREADS};
use crate::errors::{ConfigError, FailureStrategy};

/// Engine settings, usually loaded from YAML. Every field is optional.
///
/// ```
/// use buildchain::config::load_config_str;
/// use buildchain::errors::FailureStrategy;
///
/// let config = load_config_str(
///     "failure_strategy: skip_after_error\nexecutor_options:\n  worker_threads: 2\n",
/// )
/// .unwrap();
///
/// assert_eq!(config.failure_strategy, FailureStrategy::SkipAfterError);
/// assert_eq!(config.executor_options.worker_count(), 2);
/// assert!(config.graph_output.is_none());
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    /// Where to write a DOT rendering of every built chain.
    #[serde(default)]
    pub graph_output: Option<PathBuf>,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub worker_threads: Option<usize>,
    pub thread_name: Option<String>,
}

impl ExecutorOptions {
    /// Configured worker count, else the platform's available parallelism.
    pub fn worker_count(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_WORKER_THREADS)
        })
    }

    pub fn thread_name(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(DEFAULT_THREAD_NAME)
    }

    /// Builds the multi-threaded runtime that executes build steps.
    pub fn build_runtime(&self) -> Result<Runtime, ConfigError> {
        let workers = self.worker_count();
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name(self.thread_name())
            .enable_all()
            .build()
            .map_err(ConfigError::Runtime)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&content)
}

pub fn load_config_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let cfg: EngineConfig = serde_yaml::from_str(content)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
failure_strategy: skip_after_error
graph_output: target/chain.dot
executor_options:
  worker_threads: 3
  thread_name: compile-worker
"#;

        let cfg = load_config_str(yaml).unwrap();
        assert_eq!(cfg.failure_strategy, FailureStrategy::SkipAfterError);
        assert_eq!(cfg.graph_output, Some(PathBuf::from("target/chain.dot")));
        assert_eq!(cfg.executor_options.worker_count(), 3);
        assert_eq!(cfg.executor_options.thread_name(), "compile-worker");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = load_config_str("{}").unwrap();
        assert_eq!(cfg.failure_strategy, FailureStrategy::ContinueOnError);
        assert!(cfg.graph_output.is_none());
        assert!(cfg.executor_options.worker_count() >= 1);
        assert_eq!(cfg.executor_options.thread_name(), DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_unknown_failure_strategy_is_rejected() {
        let result = load_config_str("failure_strategy: retry_forever\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "failure_strategy: continue_on_error").unwrap();
        writeln!(file, "executor_options:").unwrap();
        writeln!(file, "  worker_threads: 1").unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.failure_strategy, FailureStrategy::ContinueOnError);
        assert_eq!(cfg.executor_options.worker_count(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let error = load_config(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let options = ExecutorOptions {
            worker_threads: Some(0),
            thread_name: None,
        };
        assert!(matches!(options.build_runtime(), Err(ConfigError::NoWorkers)));
    }

    #[test]
    fn test_build_runtime() {
        let options = ExecutorOptions {
            worker_threads: Some(2),
            thread_name: Some("test-worker".to_string()),
        };
        let runtime = options.build_runtime().unwrap();
        let value = runtime.block_on(async { 21 * 2 });
        assert_eq!(value, 42);
    }
}
