use std::collections::BTreeSet;

use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use toto_db::models::POOL_SIZE;

use crate::analysis::tiers::{classify, split_three, Tier};
use crate::analysis::weights::{compute_weights, Strategy};
use crate::analysis::FrequencyTable;
use crate::error::{GuessError, GuessResult};

/// Calls to the supplementary generator before the fill loop gives up.
pub const FILL_MAX_ATTEMPTS: usize = 500;

pub fn validate_count(count: usize) -> GuessResult<()> {
    if count == 0 || count > POOL_SIZE as usize {
        return Err(GuessError::InvalidCount(count));
    }
    Ok(())
}

/// `count` distinct numbers from `pool`, uniformly, without replacement. Unsorted.
pub(crate) fn pick_distinct(pool: &[u8], count: usize, rng: &mut StdRng) -> Vec<u8> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// `count` distinct numbers drawn uniformly from 1..=49, sorted.
pub fn uniform_guess(count: usize, rng: &mut StdRng) -> GuessResult<Vec<u8>> {
    validate_count(count)?;
    let all: Vec<u8> = (1..=POOL_SIZE).collect();
    let mut guess = pick_distinct(&all, count, rng);
    guess.sort();
    Ok(guess)
}

/// Sampling distribution over a candidate pool, built once per request and
/// reused by every supplementary draw.
pub struct WeightedPool {
    numbers: Vec<u8>,
    dist: WeightedIndex<f64>,
    positive: usize,
}

impl WeightedPool {
    pub fn new(table: &FrequencyTable, pool: &[u8], strategy: Strategy, bias: f64) -> GuessResult<Self> {
        let weights = compute_weights(table, strategy, bias, pool)?;
        let positive = weights.iter().filter(|(_, w)| *w > 0.0).count();
        let dist = WeightedIndex::new(weights.iter().map(|(_, w)| *w))
            .map_err(|_| GuessError::DegenerateWeight)?;
        Ok(Self {
            numbers: weights.into_iter().map(|(n, _)| n).collect(),
            dist,
            positive,
        })
    }

    /// Candidates that can actually be drawn.
    pub fn positive(&self) -> usize {
        self.positive
    }

    /// `count` draws with replacement, deduplicated and sorted.
    pub fn sample(&self, count: usize, rng: &mut StdRng) -> Vec<u8> {
        let drawn: BTreeSet<u8> = (0..count).map(|_| self.numbers[self.dist.sample(rng)]).collect();
        drawn.into_iter().collect()
    }
}

/// Draws `count` numbers from `pool` with replacement, proportionally to their
/// weight, then deduplicates and sorts. The result may hold fewer than `count`
/// numbers; [`fill_unique`] tops it up.
pub fn weighted_guess(
    table: &FrequencyTable,
    pool: &[u8],
    strategy: Strategy,
    bias: f64,
    count: usize,
    rng: &mut StdRng,
) -> GuessResult<Vec<u8>> {
    Ok(WeightedPool::new(table, pool, strategy, bias)?.sample(count, rng))
}

/// Draws `count` numbers split across the Hot, Warm and Cold tiers of `pool`,
/// uniformly within each tier, sorted.
pub fn clustered_guess(
    table: &FrequencyTable,
    pool: &[u8],
    count: usize,
    rng: &mut StdRng,
) -> GuessResult<Vec<u8>> {
    validate_count(count)?;
    let tiers = classify(table, pool);
    let sizes = split_three(count);

    let mut guess = Vec::with_capacity(count);
    for (tier, required) in Tier::ALL.into_iter().zip(sizes) {
        let members = tiers.get(tier);
        if members.len() < required {
            return Err(GuessError::InsufficientTier {
                tier,
                required,
                available: members.len(),
            });
        }
        guess.extend(pick_distinct(members, required, rng));
    }

    guess.sort();
    Ok(guess)
}

/// Backfills `initial` to exactly `count` distinct numbers.
///
/// `extra` is invoked repeatedly and each unseen number it returns is appended
/// until the guess is full. After [`FILL_MAX_ATTEMPTS`] calls, or as soon as
/// `extra` fails, the partial guess is returned in `FillLoopExhausted`.
pub fn fill_unique<F>(
    initial: &[u8],
    count: usize,
    rng: &mut StdRng,
    mut extra: F,
) -> GuessResult<Vec<u8>>
where
    F: FnMut(&mut StdRng) -> GuessResult<Vec<u8>>,
{
    let mut seen = BTreeSet::new();
    let mut guess: Vec<u8> = initial
        .iter()
        .copied()
        .filter(|&n| seen.insert(n))
        .take(count)
        .collect();

    let mut attempts = 0;
    while guess.len() < count {
        if attempts == FILL_MAX_ATTEMPTS {
            return Err(GuessError::FillLoopExhausted { partial: sorted(guess) });
        }
        attempts += 1;

        let numbers = match extra(&mut *rng) {
            Ok(numbers) => numbers,
            Err(e) => {
                log::debug!("supplementary draw failed after {} attempts: {}", attempts, e);
                return Err(GuessError::FillLoopExhausted { partial: sorted(guess) });
            }
        };
        for n in numbers {
            if seen.insert(n) {
                guess.push(n);
            }
            if guess.len() == count {
                break;
            }
        }
    }

    log::debug!("fill loop completed after {} supplementary draws", attempts);
    Ok(sorted(guess))
}

fn sorted(mut guess: Vec<u8>) -> Vec<u8> {
    guess.sort();
    guess
}
