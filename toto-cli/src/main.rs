mod display;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::display::{display_draws, display_frequencies, display_guesses, display_summary};
use toto_db::db::{append_draw, db_path, load_history, load_history_or_empty, next_draw_number};
use toto_db::models::{validate_date, validate_draw, validate_numbers, Draw, PICK_COUNT, POOL_SIZE};
use toto_engine::analysis::weights::Strategy;
use toto_engine::config::{load_config, save_config, GuessConfig};
use toto_engine::{frequency_report, generate_many, recently_excluded_numbers, GenerateMode, GenerateParams};

#[derive(Parser)]
#[command(name = "toto", about = "Singapore TOTO number generator. For entertainment only.")]
struct Cli {
    /// History CSV (newest draw first). Defaults to data/ToTo.csv
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Uniform random guesses
    Random {
        /// Numbers per guess (6-12)
        #[arg(short, long, default_value = "6", value_parser = parse_count)]
        count: usize,

        /// Number of guesses (1-10)
        #[arg(short, long, default_value = "1", value_parser = parse_sets)]
        sets: usize,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Frequency-weighted guesses
    Smart {
        /// Favour frequent or rare numbers
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Exclude numbers from the latest N draws (1-5)
        #[arg(short, long, value_parser = parse_exclude)]
        exclude_recent: Option<usize>,

        /// Keep recently drawn numbers in the candidate pool
        #[arg(long)]
        no_exclude: bool,

        /// Weight strength (0 = random, 3 = strong bias)
        #[arg(short, long, value_parser = parse_bias)]
        bias: Option<f64>,

        /// Numbers per guess (6-12)
        #[arg(short, long, value_parser = parse_count)]
        count: Option<usize>,

        /// Number of guesses (1-10)
        #[arg(short, long, default_value = "1", value_parser = parse_sets)]
        sets: usize,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Load settings from a JSON file; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the effective settings to a JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Hot-warm-cold guesses
    Cluster {
        /// Exclude numbers from the latest N draws (1-5)
        #[arg(short, long, default_value = "1", value_parser = parse_exclude)]
        exclude_recent: usize,

        /// Keep recently drawn numbers in the candidate pool
        #[arg(long)]
        no_exclude: bool,

        /// Numbers per guess (6-12)
        #[arg(short, long, default_value = "6", value_parser = parse_count)]
        count: usize,

        /// Number of guesses (1-10)
        #[arg(short, long, default_value = "1", value_parser = parse_sets)]
        sets: usize,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Number frequencies and recently drawn numbers
    Stats {
        /// Recent draws to report (1-5)
        #[arg(short, long, default_value = "1", value_parser = parse_exclude)]
        exclude_recent: usize,
    },

    /// List the latest draws
    List {
        /// Number of draws to show
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Add a draw result manually
    Add,

    /// Print the history file path
    DataPath,
}

fn parse_ranged(s: &str, min: usize, max: usize) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if value < min || value > max {
        return Err(format!("must be between {} and {}", min, max));
    }
    Ok(value)
}

fn parse_count(s: &str) -> Result<usize, String> {
    parse_ranged(s, 6, 12)
}

fn parse_sets(s: &str) -> Result<usize, String> {
    parse_ranged(s, 1, 10)
}

fn parse_exclude(s: &str) -> Result<usize, String> {
    parse_ranged(s, 1, 5)
}

fn parse_bias(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=3.0).contains(&value) {
        return Err("must be between 0.0 and 3.0".to_string());
    }
    Ok(value)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let path = cli.data.unwrap_or_else(db_path);
    log::debug!("history file: {}", path.display());

    match cli.command {
        Command::Random { count, sets, seed } => cmd_random(count, sets, seed),
        Command::Smart {
            strategy,
            exclude_recent,
            no_exclude,
            bias,
            count,
            sets,
            seed,
            config,
            save,
        } => {
            let mut settings = match &config {
                Some(file) => load_config(file)?,
                None => GuessConfig::default(),
            };
            if let Some(strategy) = strategy {
                settings.strategy = strategy;
            }
            if let Some(n) = exclude_recent {
                settings.exclude_recent = true;
                settings.exclude_n = n;
            }
            if no_exclude {
                settings.exclude_recent = false;
            }
            if let Some(bias) = bias {
                settings.bias_strength = bias;
            }
            if let Some(count) = count {
                settings.count = count;
            }
            if let Some(file) = &save {
                save_config(&settings, file)?;
                println!("Settings saved to {}", file.display());
            }
            cmd_smart(&path, &settings, sets, seed)
        }
        Command::Cluster {
            exclude_recent,
            no_exclude,
            count,
            sets,
            seed,
        } => {
            let params = GenerateParams {
                count,
                exclude_recent: !no_exclude,
                exclude_n: exclude_recent,
                ..GenerateParams::default()
            };
            cmd_cluster(&path, &params, sets, seed)
        }
        Command::Stats { exclude_recent } => cmd_stats(&path, exclude_recent),
        Command::List { last } => cmd_list(&path, last),
        Command::Add => cmd_add(&path),
        Command::DataPath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn load_non_empty(path: &Path) -> Result<Vec<Draw>> {
    if !path.exists() {
        bail!("No history at {}. Pass --data FILE or add a draw first: toto add", path.display());
    }
    let history = load_history(path)?;
    if history.is_empty() {
        bail!("{} contains no draws", path.display());
    }
    println!("Latest draw in dataset: {} (draw {})", history[0].date, history[0].draw_number);
    Ok(history)
}

fn cmd_random(count: usize, sets: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = make_rng(seed);
    let params = GenerateParams {
        count,
        ..GenerateParams::default()
    };
    let outcomes = generate_many(&[], GenerateMode::Random, &params, sets, &mut rng)?;
    display_guesses("Random guesses", &outcomes);
    Ok(())
}

fn cmd_smart(path: &Path, settings: &GuessConfig, sets: usize, seed: Option<u64>) -> Result<()> {
    let history = load_non_empty(path)?;
    let mut rng = make_rng(seed);
    let params = settings.params();

    let title = format!(
        "Weighted guesses ({}, bias {:.1}{})",
        params.strategy,
        params.bias_strength,
        exclusion_label(&params)
    );
    let outcomes = generate_many(&history, GenerateMode::Weighted, &params, sets, &mut rng)?;
    display_guesses(&title, &outcomes);
    Ok(())
}

fn cmd_cluster(path: &Path, params: &GenerateParams, sets: usize, seed: Option<u64>) -> Result<()> {
    let history = load_non_empty(path)?;
    let mut rng = make_rng(seed);

    let title = format!("Hot-warm-cold guesses{}", exclusion_label(params));
    let outcomes = generate_many(&history, GenerateMode::Clustered, params, sets, &mut rng)?;
    display_guesses(&title, &outcomes);
    Ok(())
}

fn exclusion_label(params: &GenerateParams) -> String {
    if params.exclude_recent {
        format!(", excluding last {} draw(s)", params.exclude_n)
    } else {
        String::new()
    }
}

fn cmd_stats(path: &Path, recent: usize) -> Result<()> {
    let history = load_non_empty(path)?;
    let report = frequency_report(&history);
    let excluded = recently_excluded_numbers(&history, recent);
    display_frequencies(&report, history.len());
    println!(
        "\nNumbers drawn in the last {} draw(s): {}",
        recent,
        excluded.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn cmd_list(path: &Path, last: usize) -> Result<()> {
    let history = load_history_or_empty(path)?;
    if history.is_empty() {
        println!("No draws recorded yet. Add one with: toto add");
        return Ok(());
    }
    display_draws(&history[..last.min(history.len())]);
    Ok(())
}

fn cmd_add(path: &Path) -> Result<()> {
    let history = load_history_or_empty(path)?;
    let draw_number = next_draw_number(&history);
    println!("Adding draw {}\n", draw_number);

    let raw_date = prompt("Draw date (YYYY-MM-DD, empty for today): ")?;
    let date = if raw_date.is_empty() {
        chrono::Local::now().date_naive()
    } else {
        validate_date(&raw_date)?
    };

    let numbers = prompt_numbers()?;
    let additional = prompt_additional(&numbers)?;
    validate_draw(&numbers, additional)?;

    let draw = Draw {
        draw_number,
        date: date.format("%Y-%m-%d").to_string(),
        numbers,
        additional,
    };

    println!("\nDraw to record:");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirm? (y/n): ")?;
    if confirm.trim().to_lowercase() == "y" {
        let summary = append_draw(path, &draw)?;
        println!("Draw {} added to {}.", draw.draw_number, path.display());
        display_summary(&summary);
    } else {
        println!("Cancelled.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Cannot read input")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt(&format!("{} winning numbers (space separated, 1-{}): ", PICK_COUNT, POOL_SIZE))?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == PICK_COUNT => {
                let mut arr = [0u8; PICK_COUNT];
                arr.copy_from_slice(&v);
                if validate_numbers(&arr).is_ok() {
                    return Ok(arr);
                }
                println!("Invalid numbers (1-{}, no duplicates). Try again.", POOL_SIZE);
            }
            _ => println!("Enter exactly {} numbers. Try again.", PICK_COUNT),
        }
    }
}

fn prompt_additional(numbers: &[u8; PICK_COUNT]) -> Result<u8> {
    loop {
        let input = prompt(&format!("Additional number (1-{}): ", POOL_SIZE))?;
        match input.parse::<u8>() {
            Ok(n) if validate_draw(numbers, n).is_ok() => return Ok(n),
            _ => println!("Invalid additional number (1-{}, not a winning number). Try again.", POOL_SIZE),
        }
    }
}
