pub mod analysis;
pub mod config;
pub mod error;
pub mod generate;
pub mod sampler;

pub use error::{GuessError, GuessResult};
pub use generate::{
    frequency_report, generate, generate_many, recently_excluded_numbers, Fallback, GenerateMode,
    GenerateOutcome, GenerateParams,
};
