use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error;

// --- Default values
pub const DEFAULT_EXECUTION_MODE: ExecutionMode = ExecutionMode::Concurrent;
pub const DEFAULT_MAX_CONCURRENT_INVOCATIONS: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IOError: {0}")]
    IOError(#[from] io::Error),
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("max_concurrent_invocations must be at least 1")]
    ZeroConcurrency,
}

/// How per-service invocations of a single round are scheduled.
///
/// Both modes produce identical posterior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Invocations run one after another on the calling task.
    Sequential,
    /// Invocations run as spawned tokio tasks.
    Concurrent,
}

/// Runtime settings of the accumulation executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulateConfig {
    pub execution_mode: ExecutionMode,
    /// Upper bound of in-flight invocations in `Concurrent` mode.
    pub max_concurrent_invocations: usize,
}

impl Default for AccumulateConfig {
    fn default() -> Self {
        Self {
            execution_mode: DEFAULT_EXECUTION_MODE,
            max_concurrent_invocations: DEFAULT_MAX_CONCURRENT_INVOCATIONS,
        }
    }
}

impl AccumulateConfig {
    pub fn sequential() -> Self {
        Self {
            execution_mode: ExecutionMode::Sequential,
            ..Default::default()
        }
    }

    pub fn with_execution_mode(mut self, execution_mode: ExecutionMode) -> Self {
        self.execution_mode = execution_mode;
        self
    }

    pub fn with_max_concurrent_invocations(mut self, max: usize) -> Self {
        self.max_concurrent_invocations = max;
        self
    }

    pub fn is_concurrent(&self) -> bool {
        self.execution_mode == ExecutionMode::Concurrent
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_invocations == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}
