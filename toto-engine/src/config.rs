use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::weights::Strategy;
use crate::generate::GenerateParams;

/// Saved settings for the weighted and clustered generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessConfig {
    pub count: usize,
    pub strategy: Strategy,
    pub exclude_recent: bool,
    pub exclude_n: usize,
    pub bias_strength: f64,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            count: 6,
            strategy: Strategy::Frequent,
            exclude_recent: true,
            exclude_n: 1,
            bias_strength: 1.0,
        }
    }
}

impl GuessConfig {
    pub fn params(&self) -> GenerateParams {
        GenerateParams {
            count: self.count,
            strategy: self.strategy,
            exclude_recent: self.exclude_recent,
            exclude_n: self.exclude_n,
            bias_strength: self.bias_strength,
        }
    }
}

pub fn load_config(path: &Path) -> Result<GuessConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let config: GuessConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &GuessConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    log::info!("configuration saved to {}", path.display());
    Ok(())
}
