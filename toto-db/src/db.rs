use anyhow::{bail, Context, Result};
use csv::StringRecord;
use std::path::{Path, PathBuf};

use crate::models::{validate_draw, validate_numbers, Draw, DrawSummary, PICK_COUNT, PRIZE_DIVISIONS};

const DRAW: &str = "Draw";
const DATE: &str = "Date";
const WINNING: [&str; PICK_COUNT] = ["Winning Number 1", "2", "3", "4", "5", "6"];
const ADDITIONAL: &str = "Additional Number";

pub fn db_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("ToTo.csv");
    path
}

/// Full header written when the history file does not exist yet.
pub fn default_header() -> Vec<String> {
    let mut header: Vec<String> = vec![DRAW.to_string(), DATE.to_string()];
    header.extend(WINNING.iter().map(|s| s.to_string()));
    header.extend(
        [
            ADDITIONAL, "From Last", "Low", "High", "Odd", "Even", "1-10", "11-20", "21-30",
            "31-40", "41-50",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    for division in 1..=PRIZE_DIVISIONS {
        header.push(format!("Division {} Winners", division));
        header.push(format!("Division {} Prize", division));
    }
    header
}

struct Columns {
    draw: usize,
    date: usize,
    winning: [usize; PICK_COUNT],
    additional: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| format!("Missing column '{}'", name))
        };
        let mut winning = [0usize; PICK_COUNT];
        for (slot, name) in winning.iter_mut().zip(WINNING) {
            *slot = find(name)?;
        }
        Ok(Self {
            draw: find(DRAW)?,
            date: find(DATE)?,
            winning,
            additional: find(ADDITIONAL).ok(),
        })
    }
}

fn parse_record(record: &StringRecord, columns: &Columns) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Cannot parse '{}' (index {})", s, idx))
    };

    let raw_draw = get(columns.draw)?;
    let draw_number = raw_draw
        .parse::<u32>()
        .with_context(|| format!("Cannot parse draw number '{}'", raw_draw))?;
    let date = get(columns.date)?;

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, &idx) in numbers.iter_mut().zip(columns.winning.iter()) {
        *slot = get_u8(idx)?;
    }

    // older exports leave the additional number blank
    let additional = match columns.additional {
        Some(idx) => get(idx).ok().and_then(|s| s.parse::<u8>().ok()).unwrap_or(0),
        None => 0,
    };
    if additional == 0 {
        validate_numbers(&numbers)?;
    } else {
        validate_draw(&numbers, additional)?;
    }

    Ok(Draw {
        draw_number,
        date,
        numbers,
        additional,
    })
}

/// Reads the history file, newest draw first.
pub fn load_history(path: &Path) -> Result<Vec<Draw>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let headers = reader.headers().context("Cannot read header row")?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut draws = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Cannot read row {}", line + 1))?;
        let draw = parse_record(&record, &columns)
            .with_context(|| format!("Invalid row {}", line + 1))?;
        draws.push(draw);
    }

    // files are stored newest first, but uploaded exports are not always
    draws.sort_by(|a, b| b.draw_number.cmp(&a.draw_number));
    log::debug!("loaded {} draws from {:?}", draws.len(), path);
    Ok(draws)
}

/// Loads the history, or an empty one when the file does not exist.
pub fn load_history_or_empty(path: &Path) -> Result<Vec<Draw>> {
    if path.exists() {
        load_history(path)
    } else {
        Ok(Vec::new())
    }
}

pub fn next_draw_number(history: &[Draw]) -> u32 {
    history.first().map(|d| d.draw_number + 1).unwrap_or(1)
}

fn build_row(header: &StringRecord, draw: &Draw, summary: &DrawSummary) -> StringRecord {
    let value = |name: &str| -> String {
        if let Some(pos) = WINNING.iter().position(|&w| w == name) {
            return draw.numbers[pos].to_string();
        }
        match name {
            DRAW => draw.draw_number.to_string(),
            DATE => draw.date.clone(),
            ADDITIONAL => draw.additional.to_string(),
            "From Last" => summary.from_last_field(),
            "Low" => summary.low.to_string(),
            "High" => summary.high.to_string(),
            "Odd" => summary.odd.to_string(),
            "Even" => summary.even.to_string(),
            "1-10" => summary.ranges[0].to_string(),
            "11-20" => summary.ranges[1].to_string(),
            "21-30" => summary.ranges[2].to_string(),
            "31-40" => summary.ranges[3].to_string(),
            "41-50" => summary.ranges[4].to_string(),
            other if other.starts_with("Division") && other.ends_with("Winners") => "0".to_string(),
            other if other.starts_with("Division") && other.ends_with("Prize") => "0.00".to_string(),
            _ => String::new(),
        }
    };
    header.iter().map(|h| value(h.trim())).collect()
}

/// Prepends `draw` as the new head of the history file and rewrites it.
///
/// Existing rows are copied verbatim. Returns the statistics written for the new row.
pub fn append_draw(path: &Path, draw: &Draw) -> Result<DrawSummary> {
    validate_draw(&draw.numbers, draw.additional)?;

    let (header, rows, previous) = if path.exists() {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Cannot open {:?}", path))?;
        let header = reader.headers().context("Cannot read header row")?.clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .context("Cannot read existing rows")?;
        let history = load_history(path)?;
        (header, rows, history.into_iter().next())
    } else {
        (StringRecord::from(default_header()), Vec::new(), None)
    };

    if let Some(prev) = &previous {
        if draw.draw_number <= prev.draw_number {
            bail!(
                "Draw {} is not newer than the latest recorded draw {}",
                draw.draw_number,
                prev.draw_number
            );
        }
    }

    let summary = DrawSummary::from_draw(draw, previous.as_ref());
    let row = build_row(&header, draw, &summary);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot write {:?}", path))?;
    writer.write_record(&header)?;
    writer.write_record(&row)?;
    for existing in &rows {
        writer.write_record(existing)?;
    }
    writer.flush().context("Cannot flush history file")?;

    log::info!("draw {} appended to {:?}", draw.draw_number, path);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(number: u32, numbers: [u8; 6]) -> Draw {
        Draw {
            draw_number: number,
            date: format!("2025-01-{:02}", number % 28 + 1),
            numbers,
            additional: 49,
        }
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("ToTo.csv");

        append_draw(&path, &test_draw(1, [1, 2, 3, 4, 5, 6])).unwrap();
        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(history[0].additional, 49);
    }

    #[test]
    fn test_append_prepends_newest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");

        append_draw(&path, &test_draw(1, [1, 2, 3, 4, 5, 6])).unwrap();
        let summary = append_draw(&path, &test_draw(2, [6, 7, 8, 9, 10, 1])).unwrap();
        assert_eq!(summary.from_last, vec![6, 1]);

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].draw_number, 2);
        assert_eq!(history[1].draw_number, 1);
        assert_eq!(next_draw_number(&history), 3);
    }

    #[test]
    fn test_append_rejects_stale_draw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");

        append_draw(&path, &test_draw(5, [1, 2, 3, 4, 5, 6])).unwrap();
        assert!(append_draw(&path, &test_draw(5, [7, 8, 9, 10, 11, 12])).is_err());
        assert!(append_draw(&path, &test_draw(4, [7, 8, 9, 10, 11, 12])).is_err());
        assert_eq!(load_history(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_append_rejects_invalid_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");
        assert!(append_draw(&path, &test_draw(1, [1, 1, 3, 4, 5, 6])).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_append_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");
        std::fs::write(
            &path,
            "Draw,Date,Winning Number 1,2,3,4,5,6,Additional Number,Division 1 Prize\n\
             10,2025-01-02,1,2,3,4,5,6,7,1234567.00\n",
        )
        .unwrap();

        append_draw(&path, &test_draw(11, [2, 12, 22, 32, 42, 44])).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Draw,Date,Winning Number 1,2,3,4,5,6,Additional Number,Division 1 Prize");
        assert!(lines[1].starts_with("11,"));
        assert!(lines[1].ends_with(",0.00"));
        assert_eq!(lines[2], "10,2025-01-02,1,2,3,4,5,6,7,1234567.00");
    }

    #[test]
    fn test_load_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");
        std::fs::write(
            &path,
            "Draw,Date,Winning Number 1,2,3,4,5,6\n\
             1,2025-01-01,1,2,3,4,5,6\n\
             3,2025-01-08,7,8,9,10,11,12\n\
             2,2025-01-04,13,14,15,16,17,18\n",
        )
        .unwrap();

        let history = load_history(&path).unwrap();
        let ids: Vec<u32> = history.iter().map(|d| d.draw_number).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(history[0].additional, 0);
    }

    #[test]
    fn test_load_rejects_invalid_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Draw,Date,Winning Number 1,2,3,4,5,6,Additional Number\n";
        let cases = [
            "1,2025-01-01,1,2,3,4,5,50,7\n",
            "1,2025-01-01,0,2,3,4,5,6,7\n",
            "1,2025-01-01,1,2,3,4,5,5,7\n",
            "1,2025-01-01,1,2,3,4,5,6,6\n",
        ];
        for (i, row) in cases.iter().enumerate() {
            let path = dir.path().join(format!("bad{}.csv", i));
            std::fs::write(&path, format!("{}{}", header, row)).unwrap();
            let err = load_history(&path).unwrap_err();
            assert!(format!("{:#}", err).contains("Invalid row 1"), "{:#}", err);
        }

        let path = dir.path().join("blank_additional.csv");
        std::fs::write(&path, format!("{}1,2025-01-01,1,2,3,4,5,6,\n", header)).unwrap();
        assert_eq!(load_history(&path).unwrap()[0].additional, 0);
    }

    #[test]
    fn test_load_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToTo.csv");
        std::fs::write(&path, "Draw,Date,1,2,3,4,5,6\n1,2025-01-01,1,2,3,4,5,6\n").unwrap();
        assert!(load_history(&path).is_err());
    }

    #[test]
    fn test_load_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_history_or_empty(&dir.path().join("absent.csv")).unwrap();
        assert!(history.is_empty());
        assert_eq!(next_draw_number(&history), 1);
    }

    #[test]
    fn test_default_header_layout() {
        let header = default_header();
        assert_eq!(header.len(), 2 + 6 + 11 + 14);
        assert_eq!(header[2], "Winning Number 1");
        assert_eq!(header.last().unwrap(), "Division 7 Prize");
    }
}
