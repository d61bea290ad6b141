use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use toto_db::models::{Draw, DrawSummary};
use toto_engine::{Fallback, GenerateOutcome, GuessError};

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn fallback_note(fallback: &Fallback) -> String {
    match fallback {
        Fallback::SmallCandidatePool { available } => {
            format!("random: only {} candidates left", available)
        }
        Fallback::Uniform(GuessError::DegenerateWeight) => "random: no usable weights".to_string(),
        Fallback::Uniform(GuessError::InsufficientTier { tier, .. }) => {
            format!("random: {} tier too small", tier)
        }
        Fallback::Uniform(e) => format!("random: {}", e),
        Fallback::ZeroWeightTopUp { weighted, missing } => {
            format!("only {} weighted, {} filled at random", weighted, missing)
        }
        Fallback::FillTopUp { missing } => format!("{} filled at random", missing),
    }
}

pub fn display_guesses(title: &str, outcomes: &[GenerateOutcome]) {
    println!("\n🎲 {title}\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numbers", "Note"]);

    for (i, outcome) in outcomes.iter().enumerate() {
        let note = match &outcome.fallback {
            Some(fallback) => Cell::new(fallback_note(fallback)).fg(Color::Yellow),
            None => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(format!("{}", i + 1)),
            Cell::new(join_numbers(&outcome.guess)),
            note,
        ]);
    }
    println!("{table}");
    println!("Please gamble responsibly.");
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("No draws to show.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Draw", "Date", "Winning numbers", "Additional"]);

    for draw in draws {
        let additional = if draw.additional > 0 {
            draw.additional.to_string()
        } else {
            "—".to_string()
        };
        table.add_row(vec![
            &draw.draw_number.to_string(),
            &draw.date,
            &join_numbers(&draw.sorted_numbers()),
            &additional,
        ]);
    }

    println!("{table}");
}

pub fn display_frequencies(report: &[(u8, u32)], draw_count: usize) {
    println!("\n📊 Frequencies over {} draws\n", draw_count);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Number", "Frequency"]);

    let max = report.first().map(|&(_, c)| c).unwrap_or(0);
    let min = report.last().map(|&(_, c)| c).unwrap_or(0);
    for &(number, count) in report {
        let color = if max > min && count == max {
            Color::Green
        } else if max > min && count == min {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", number)),
            Cell::new(count.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_summary(summary: &DrawSummary) {
    let from_last = if summary.from_last.is_empty() {
        "—".to_string()
    } else {
        summary.from_last_field()
    };
    println!("  From last draw : {}", from_last);
    println!("  Low / High     : {} / {}", summary.low, summary.high);
    println!("  Odd / Even     : {} / {}", summary.odd, summary.even);
    println!(
        "  1-10 | 11-20 | 21-30 | 31-40 | 41-50 : {} | {} | {} | {} | {}",
        summary.ranges[0], summary.ranges[1], summary.ranges[2], summary.ranges[3], summary.ranges[4]
    );
}
