use serde::{Deserialize, Serialize};

use super::FrequencyTable;
use crate::error::{GuessError, GuessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Favour numbers drawn often
    #[default]
    Frequent,
    /// Favour numbers drawn rarely
    Rare,
}

impl Strategy {
    /// Weight for a normalized frequency in [0, 1]. `0^0` is 1, so a zero bias is uniform.
    pub fn weight(&self, normalized: f64, bias: f64) -> f64 {
        match self {
            Strategy::Frequent => normalized.powf(bias),
            Strategy::Rare => (1.0 - normalized).powf(bias),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Frequent => write!(f, "frequent"),
            Strategy::Rare => write!(f, "rare"),
        }
    }
}

pub fn validate_bias(bias: f64) -> GuessResult<()> {
    if bias.is_finite() && bias >= 0.0 {
        Ok(())
    } else {
        Err(GuessError::InvalidBias(bias))
    }
}

/// Sampling weight of every number in `pool`, in pool order.
pub fn compute_weights(
    table: &FrequencyTable,
    strategy: Strategy,
    bias: f64,
    pool: &[u8],
) -> GuessResult<Vec<(u8, f64)>> {
    validate_bias(bias)?;

    let weights: Vec<(u8, f64)> = pool
        .iter()
        .map(|&n| (n, strategy.weight(table.normalized(n), bias)))
        .collect();

    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(GuessError::DegenerateWeight);
    }

    Ok(weights)
}
