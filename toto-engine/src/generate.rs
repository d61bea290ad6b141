use rand::rngs::StdRng;

use toto_db::models::Draw;

use crate::analysis::weights::{validate_bias, Strategy};
use crate::analysis::{candidate_pool, compute_frequencies, recent_numbers};
use crate::error::{GuessError, GuessResult};
use crate::sampler::{clustered_guess, fill_unique, pick_distinct, uniform_guess, validate_count, WeightedPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    Random,
    Weighted,
    Clustered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub count: usize,
    /// Weighted mode only.
    pub strategy: Strategy,
    pub exclude_recent: bool,
    /// Ignored unless `exclude_recent` is set.
    pub exclude_n: usize,
    /// Weighted mode only.
    pub bias_strength: f64,
}

impl Default for GenerateParams {
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

impl GenerateParams {
    fn effective_exclusion(&self) -> usize {
        if self.exclude_recent {
            self.exclude_n
        } else {
            0
        }
    }
}

/// Why a request did not get the strategy it asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// Fewer candidates than requested numbers once recent draws were excluded.
    SmallCandidatePool { available: usize },
    /// The strategy itself refused the request; the guess is uniform.
    Uniform(GuessError),
    /// Fewer candidates than requested carry any weight; the `missing` numbers
    /// are uniform among the zero-weight candidates.
    ZeroWeightTopUp { weighted: usize, missing: usize },
    /// The fill loop stopped early; the last `missing` numbers are uniform
    /// among the remaining candidates.
    FillTopUp { missing: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOutcome {
    pub guess: Vec<u8>,
    pub fallback: Option<Fallback>,
}

impl GenerateOutcome {
    fn direct(guess: Vec<u8>) -> Self {
        Self {
            guess,
            fallback: None,
        }
    }
}

/// Produces one guess of exactly `params.count` distinct, sorted numbers.
///
/// Recoverable strategy failures are resolved here and reported through
/// `GenerateOutcome::fallback`. Only precondition failures are returned as errors.
pub fn generate(
    history: &[Draw],
    mode: GenerateMode,
    params: &GenerateParams,
    rng: &mut StdRng,
) -> GuessResult<GenerateOutcome> {
    validate_count(params.count)?;

    match mode {
        GenerateMode::Random => Ok(GenerateOutcome::direct(uniform_guess(params.count, rng)?)),
        GenerateMode::Weighted => generate_weighted(history, params, rng),
        GenerateMode::Clustered => generate_clustered(history, params, rng),
    }
}

/// Several independent guesses for the same request.
pub fn generate_many(
    history: &[Draw],
    mode: GenerateMode,
    params: &GenerateParams,
    sets: usize,
    rng: &mut StdRng,
) -> GuessResult<Vec<GenerateOutcome>> {
    (0..sets)
        .map(|_| generate(history, mode, params, rng))
        .collect()
}

fn uniform_fallback(
    fallback: Fallback,
    count: usize,
    rng: &mut StdRng,
) -> GuessResult<GenerateOutcome> {
    log::warn!("falling back to uniform random guess: {:?}", fallback);
    Ok(GenerateOutcome {
        guess: uniform_guess(count, rng)?,
        fallback: Some(fallback),
    })
}

fn generate_weighted(
    history: &[Draw],
    params: &GenerateParams,
    rng: &mut StdRng,
) -> GuessResult<GenerateOutcome> {
    if history.is_empty() {
        return Err(GuessError::EmptyHistory);
    }
    validate_bias(params.bias_strength)?;

    let table = compute_frequencies(history);
    let excluded = recent_numbers(history, params.effective_exclusion());
    let pool = candidate_pool(&excluded);
    log::debug!(
        "weighted guess: strategy={} bias={} excluded={} pool={}",
        params.strategy,
        params.bias_strength,
        excluded.len(),
        pool.len()
    );

    if pool.len() < params.count {
        return uniform_fallback(
            Fallback::SmallCandidatePool {
                available: pool.len(),
            },
            params.count,
            rng,
        );
    }

    let weighted = match WeightedPool::new(&table, &pool, params.strategy, params.bias_strength) {
        Ok(weighted) => weighted,
        Err(e @ GuessError::DegenerateWeight) => {
            return uniform_fallback(Fallback::Uniform(e), params.count, rng);
        }
        Err(e) => return Err(e),
    };

    // Weighted draws can never reach more than the positively weighted
    // candidates; anything beyond that comes from the rest of the pool.
    let target = params.count.min(weighted.positive());
    let raw = weighted.sample(params.count, rng);
    let filled = fill_unique(&raw, target, rng, |r| Ok(weighted.sample(params.count, r)));

    let (guess, exhausted) = match filled {
        Ok(guess) => (guess, false),
        Err(GuessError::FillLoopExhausted { partial }) => (partial, true),
        Err(e) => return Err(e),
    };
    if guess.len() == params.count {
        return Ok(GenerateOutcome::direct(guess));
    }

    let missing = params.count - guess.len();
    let fallback = if exhausted {
        log::warn!("fill loop exhausted, topping up {} numbers uniformly", missing);
        Fallback::FillTopUp { missing }
    } else {
        log::warn!(
            "only {} weighted candidates, topping up {} numbers uniformly",
            weighted.positive(),
            missing
        );
        Fallback::ZeroWeightTopUp {
            weighted: weighted.positive(),
            missing,
        }
    };
    Ok(GenerateOutcome {
        guess: top_up_uniform(guess, &pool, params.count, rng),
        fallback: Some(fallback),
    })
}

/// Completes `partial` to `count` numbers with uniform picks from `pool`.
fn top_up_uniform(partial: Vec<u8>, pool: &[u8], count: usize, rng: &mut StdRng) -> Vec<u8> {
    let mut guess = partial;
    let remaining: Vec<u8> = pool.iter().copied().filter(|n| !guess.contains(n)).collect();
    let missing = count.saturating_sub(guess.len());
    guess.extend(pick_distinct(&remaining, missing, rng));
    guess.sort();
    guess
}

fn generate_clustered(
    history: &[Draw],
    params: &GenerateParams,
    rng: &mut StdRng,
) -> GuessResult<GenerateOutcome> {
    if history.is_empty() {
        return Err(GuessError::EmptyHistory);
    }

    let table = compute_frequencies(history);
    let excluded = recent_numbers(history, params.effective_exclusion());
    let pool = candidate_pool(&excluded);

    match clustered_guess(&table, &pool, params.count, rng) {
        Ok(guess) => Ok(GenerateOutcome::direct(guess)),
        Err(e @ GuessError::InsufficientTier { .. }) => {
            uniform_fallback(Fallback::Uniform(e), params.count, rng)
        }
        Err(e) => Err(e),
    }
}

/// Frequency of every number, most frequent first, ties by ascending number.
pub fn frequency_report(history: &[Draw]) -> Vec<(u8, u32)> {
    let mut report: Vec<(u8, u32)> = compute_frequencies(history).iter().collect();
    report.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    report
}

pub fn recently_excluded_numbers(history: &[Draw], n: usize) -> Vec<u8> {
    recent_numbers(history, n).into_iter().collect()
}
