pub mod tiers;
pub mod weights;

use std::collections::BTreeSet;

use toto_db::models::{Draw, POOL_SIZE};

/// Occurrence count per number, always covering 1..=49.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; POOL_SIZE as usize],
    max: u32,
}

impl FrequencyTable {
    pub fn zeroed() -> Self {
        Self {
            counts: [0; POOL_SIZE as usize],
            max: 0,
        }
    }

    /// Count for `number`; numbers outside 1..=49 have none.
    pub fn get(&self, number: u8) -> u32 {
        if number == 0 {
            return 0;
        }
        self.counts.get((number - 1) as usize).copied().unwrap_or(0)
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| ((i + 1) as u8, c))
    }

    /// Count scaled into [0, 1] by the largest count; all zero when nothing was drawn.
    pub fn normalized(&self, number: u8) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            self.get(number) as f64 / self.max as f64
        }
    }
}

/// Counts, for each number, the draws it appears in. A draw counts a number at most once.
pub fn compute_frequencies(draws: &[Draw]) -> FrequencyTable {
    let mut table = FrequencyTable::zeroed();

    for draw in draws {
        let mut seen = [false; POOL_SIZE as usize];
        for &n in &draw.numbers {
            if n == 0 {
                continue;
            }
            let idx = (n - 1) as usize;
            if idx < seen.len() && !seen[idx] {
                seen[idx] = true;
                table.counts[idx] += 1;
            }
        }
    }
    table.max = table.counts.iter().copied().max().unwrap_or(0);

    table
}

/// Numbers drawn in the `n` most recent draws. `draws[0]` is the newest; `n` is clamped.
pub fn recent_numbers(draws: &[Draw], n: usize) -> BTreeSet<u8> {
    draws
        .iter()
        .take(n)
        .flat_map(|d| d.numbers.iter().copied())
        .filter(|&x| (1..=POOL_SIZE).contains(&x))
        .collect()
}

/// Numbers 1..=49 not in `excluded`, ascending.
pub fn candidate_pool(excluded: &BTreeSet<u8>) -> Vec<u8> {
    (1..=POOL_SIZE).filter(|n| !excluded.contains(n)).collect()
}

#[cfg(test)]
pub(crate) fn make_draw(number: u32, numbers: [u8; 6]) -> Draw {
    Draw {
        draw_number: number,
        date: format!("2025-01-{:02}", number % 28 + 1),
        numbers,
        additional: 0,
    }
}
