use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

/// Highest drawable number (1-49).
pub const POOL_SIZE: u8 = 49;
/// Winning numbers per draw.
pub const PICK_COUNT: usize = 6;
/// Prize divisions, written as zero placeholders on manual entry.
pub const PRIZE_DIVISIONS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub draw_number: u32,
    pub date: String,
    pub numbers: [u8; PICK_COUNT],
    pub additional: u8,
}

impl Draw {
    pub fn sorted_numbers(&self) -> [u8; PICK_COUNT] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }
}

/// Statistics derived from a draw, stored next to its numbers in the history file.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSummary {
    pub from_last: Vec<u8>,
    pub low: u8,
    pub high: u8,
    pub odd: u8,
    pub even: u8,
    /// Counts for 1-10, 11-20, 21-30, 31-40, 41-50.
    pub ranges: [u8; 5],
}

impl DrawSummary {
    /// `previous` is the history head before `draw` is added.
    pub fn from_draw(draw: &Draw, previous: Option<&Draw>) -> Self {
        let numbers = &draw.numbers;
        let low = numbers.iter().copied().min().unwrap_or(0);
        let high = numbers.iter().copied().max().unwrap_or(0);
        let odd = numbers.iter().filter(|&&n| n % 2 == 1).count() as u8;
        let even = PICK_COUNT as u8 - odd;

        let mut ranges = [0u8; 5];
        for &n in numbers {
            if n >= 1 {
                let bucket = ((n - 1) / 10) as usize;
                if bucket < ranges.len() {
                    ranges[bucket] += 1;
                }
            }
        }

        // keeps entry order
        let from_last = match previous {
            Some(prev) => numbers
                .iter()
                .copied()
                .filter(|n| prev.numbers.contains(n))
                .collect(),
            None => Vec::new(),
        };

        Self {
            from_last,
            low,
            high,
            odd,
            even,
            ranges,
        }
    }

    pub fn from_last_field(&self) -> String {
        self.from_last
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Six distinct winning numbers, each in 1-49.
pub fn validate_numbers(numbers: &[u8; PICK_COUNT]) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Number {} out of range (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    Ok(())
}

pub fn validate_draw(numbers: &[u8; PICK_COUNT], additional: u8) -> Result<()> {
    validate_numbers(numbers)?;
    if additional < 1 || additional > POOL_SIZE {
        bail!("Additional number {} out of range (1-{})", additional, POOL_SIZE);
    }
    if numbers.contains(&additional) {
        bail!("Additional number {} is already a winning number", additional);
    }
    Ok(())
}

pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(number: u32, numbers: [u8; 6]) -> Draw {
        Draw {
            draw_number: number,
            date: "2025-01-02".to_string(),
            numbers,
            additional: 49,
        }
    }

    #[test]
    fn test_validate_draw_ok() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 7).is_ok());
        assert!(validate_draw(&[49, 48, 47, 46, 45, 44], 1).is_ok());
    }

    #[test]
    fn test_validate_draw_out_of_range() {
        assert!(validate_draw(&[0, 2, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 50], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 50).is_err());
    }

    #[test]
    fn test_validate_draw_duplicates() {
        assert!(validate_draw(&[1, 1, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 6).is_err());
    }

    #[test]
    fn test_validate_numbers_ignores_additional() {
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 49]).is_ok());
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 0]).is_err());
        assert!(validate_numbers(&[7, 2, 3, 4, 5, 7]).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-03-10").is_ok());
        assert!(validate_date("10/03/2025").is_err());
        assert!(validate_date("2025-02-30").is_err());
    }

    #[test]
    fn test_summary_counts() {
        let d = draw(2, [3, 14, 25, 36, 41, 49]);
        let summary = DrawSummary::from_draw(&d, None);
        assert_eq!(summary.low, 3);
        assert_eq!(summary.high, 49);
        assert_eq!(summary.odd, 4);
        assert_eq!(summary.even, 2);
        assert_eq!(summary.ranges, [1, 1, 1, 1, 2]);
        assert!(summary.from_last.is_empty());
    }

    #[test]
    fn test_summary_from_last() {
        let prev = draw(1, [1, 2, 3, 4, 5, 6]);
        let d = draw(2, [6, 10, 2, 30, 40, 45]);
        let summary = DrawSummary::from_draw(&d, Some(&prev));
        assert_eq!(summary.from_last, vec![6, 2]);
        assert_eq!(summary.from_last_field(), "6,2");
    }

    #[test]
    fn test_sorted_numbers() {
        let d = draw(1, [9, 3, 7, 1, 44, 20]);
        assert_eq!(d.sorted_numbers(), [1, 3, 7, 9, 20, 44]);
    }
}
