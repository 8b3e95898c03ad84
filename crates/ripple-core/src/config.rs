use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{RippleError, RippleResult, StrategyKind};

/// Top-level configuration (loaded from ripple.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub harness: HarnessConfig,
    pub log: LogConfig,
}

impl RippleConfig {
    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> RippleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| RippleError::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// Strategy comparison run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Number of blocks in the generated sequence
    pub blocks: usize,
    /// Size of each generated block in bytes
    pub block_size: usize,
    /// Index of the block replaced before each strategy runs
    pub modify_index: usize,
    /// Timed repetitions per strategy
    pub trials: u32,
    /// RNG seed for block content (random if unset)
    pub seed: Option<u64>,
    /// Strategies to compare, in run order
    pub strategies: Vec<StrategyKind>,
    /// Rebuild and compare each strategy's table after it runs
    pub verify: bool,
}

impl HarnessConfig {
    /// Reject settings that cannot describe a replaceable block.
    pub fn validate(&self) -> RippleResult<()> {
        if self.blocks == 0 {
            return Err(RippleError::Config("harness.blocks must be at least 1".into()));
        }
        if self.block_size == 0 {
            return Err(RippleError::Config("harness.block_size must be at least 1".into()));
        }
        if self.modify_index >= self.blocks {
            return Err(RippleError::IndexOutOfRange {
                index: self.modify_index,
                len: self.blocks,
            });
        }
        if self.trials == 0 {
            return Err(RippleError::Config("harness.trials must be at least 1".into()));
        }
        if self.strategies.is_empty() {
            return Err(RippleError::Config("harness.strategies is empty".into()));
        }
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            blocks: 10,
            block_size: 32 * 1024,
            modify_index: 2,
            trials: 1,
            seed: None,
            strategies: StrategyKind::ALL.to_vec(),
            verify: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
