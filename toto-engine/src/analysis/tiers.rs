use toto_db::models::POOL_SIZE;

use super::FrequencyTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Hot, Tier::Warm, Tier::Cold];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Hot => write!(f, "HOT"),
            Tier::Warm => write!(f, "WARM"),
            Tier::Cold => write!(f, "COLD"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tiers {
    pub hot: Vec<u8>,
    pub warm: Vec<u8>,
    pub cold: Vec<u8>,
}

impl Tiers {
    pub fn get(&self, tier: Tier) -> &[u8] {
        match tier {
            Tier::Hot => &self.hot,
            Tier::Warm => &self.warm,
            Tier::Cold => &self.cold,
        }
    }
}

/// Splits `total` into three sizes differing by at most one, extras going to the
/// leading groups (Hot, then Warm).
pub fn split_three(total: usize) -> [usize; 3] {
    let base = total / 3;
    let extra = total % 3;
    let mut sizes = [base; 3];
    for size in sizes.iter_mut().take(extra) {
        *size += 1;
    }
    sizes
}

/// Ranks all 49 numbers by descending frequency (ties by ascending number), cuts
/// the ranking into Hot/Warm/Cold, then keeps only numbers in `pool`.
pub fn classify(table: &FrequencyTable, pool: &[u8]) -> Tiers {
    let mut ranked: Vec<(u8, u32)> = table.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let [hot_len, warm_len, _] = split_three(POOL_SIZE as usize);
    let in_pool = |slice: &[(u8, u32)]| -> Vec<u8> {
        slice
            .iter()
            .map(|&(n, _)| n)
            .filter(|n| pool.contains(n))
            .collect()
    };

    Tiers {
        hot: in_pool(&ranked[..hot_len]),
        warm: in_pool(&ranked[hot_len..hot_len + warm_len]),
        cold: in_pool(&ranked[hot_len + warm_len..]),
    }
}
