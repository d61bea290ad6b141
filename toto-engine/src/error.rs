use thiserror::Error;

use crate::analysis::tiers::Tier;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuessError {
    #[error("total weight is zero after exclusion")]
    DegenerateWeight,

    #[error("{tier} tier has {available} numbers, {required} required")]
    InsufficientTier {
        tier: Tier,
        required: usize,
        available: usize,
    },

    #[error("fill loop gave up with {} of the requested numbers", .partial.len())]
    FillLoopExhausted { partial: Vec<u8> },

    #[error("no draw history loaded")]
    EmptyHistory,

    #[error("cannot pick {0} distinct numbers from 1-49")]
    InvalidCount(usize),

    #[error("bias strength must be finite and >= 0, got {0}")]
    InvalidBias(f64),
}

pub type GuessResult<T> = Result<T, GuessError>;
