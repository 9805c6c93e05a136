//! Driver CSV import.
//!
//! The first line is the header and every other non-blank line is one driver.
//! Fields are split on bare commas: quoted fields are not understood, so a
//! value containing a comma shifts the rest of its row.

use crate::model::Driver;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;

static HEADER_NOISE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

const SAMPLE_CSV: &str = include_str!("sample_drivers.csv");

/// Defaults for fields a row leaves out
pub mod defaults {
    pub const NAME: &str = "Unknown Driver";
    pub const TEAM: &str = "Independent";
    pub const AVG_FINISH: f64 = 10.0;
    pub const CONSISTENCY: f64 = 0.75;
    pub const CRASH_RATE: f64 = 0.05;
}

#[derive(Debug)]
pub enum IngestError {
    EmptyInput,
    Csv(csv::Error),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::EmptyInput => write!(f, "The CSV file is empty"),
            IngestError::Csv(e) => write!(f, "Error processing CSV file: {}", e),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Csv(e) => Some(e),
            IngestError::EmptyInput => None,
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::Csv(e)
    }
}

/// Parsed upload: the raw table plus the drivers built from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvUpload {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub drivers: Vec<Driver>,
}

impl CsvUpload {
    /// First `n` raw rows for display.
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }
}

/// Lowercase and strip separators so `f2_position`, `F2 Position` and
/// `f2Position` name the same column.
fn normalize_header(header: &str) -> String {
    HEADER_NOISE_REGEX
        .replace_all(&header.to_ascii_lowercase(), "")
        .into_owned()
}

struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let mut map = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            map.entry(normalize_header(h)).or_insert(i);
        }
        Columns(map)
    }

    fn get<'r>(&self, record: &'r StringRecord, key: &str) -> Option<&'r str> {
        self.0
            .get(key)
            .and_then(|&i| record.get(i))
            .filter(|v| !v.is_empty())
    }
}

fn parse_count(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.trunc() as u32)
    })
}

fn parse_ratio(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

// A zero here reads as an unfilled cell rather than a real statistic.
fn parse_nonzero_ratio(value: &str) -> Option<f64> {
    parse_ratio(value).filter(|&v| v != 0.0)
}

struct RowReader<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
    line: u64,
}

impl RowReader<'_> {
    fn text(&self, key: &str) -> Option<String> {
        self.columns.get(self.record, key).map(str::to_string)
    }

    fn parsed<T>(&self, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.columns.get(self.record, key)?;
        let value = parse(raw);
        if value.is_none() {
            debug!(
                "Line {}: could not read {} value '{}', using default",
                self.line, key, raw
            );
        }
        value
    }

    fn position(&self, key: &str) -> Option<u32> {
        self.parsed(key, parse_count).filter(|&p| p > 0)
    }

    fn count(&self, key: &str) -> u32 {
        self.parsed(key, parse_count).unwrap_or(0)
    }

    fn ratio(&self, key: &str, default: f64) -> f64 {
        self.parsed(key, parse_ratio).unwrap_or(default)
    }

    fn nonzero_ratio(&self, key: &str, default: f64) -> f64 {
        self.parsed(key, parse_nonzero_ratio).unwrap_or(default)
    }

    fn driver(&self, index: usize) -> Driver {
        Driver {
            id: self.text("id").unwrap_or_else(|| format!("driver-{}", index)),
            name: self.text("name").unwrap_or_else(|| defaults::NAME.to_string()),
            team: self.text("team").unwrap_or_else(|| defaults::TEAM.to_string()),
            f2_position: self.position("f2position"),
            f3_position: self.position("f3position"),
            wins: self.count("wins"),
            podiums: self.count("podiums"),
            poles: self.count("poles"),
            avg_finish: self.nonzero_ratio("avgfinish", defaults::AVG_FINISH),
            consistency: self
                .nonzero_ratio("consistency", defaults::CONSISTENCY)
                .clamp(0.0, 1.0),
            crash_rate: self.ratio("crashrate", defaults::CRASH_RATE).clamp(0.0, 1.0),
        }
    }
}

/// Give `driver` an id no earlier row has taken, suffixing `-2`, `-3`, ...
/// on a clash.
fn claim_unique_id(driver: &mut Driver, seen_ids: &mut HashSet<String>, line: u64) {
    if seen_ids.insert(driver.id.clone()) {
        return;
    }
    let base = driver.id.clone();
    let mut n = 2;
    while !seen_ids.insert(format!("{}-{}", base, n)) {
        n += 1;
    }
    driver.id = format!("{}-{}", base, n);
    debug!(
        "Warning: Duplicate ID '{}' found on line {}, renamed to '{}'",
        base, line, driver.id
    );
}

/// Parse uploaded CSV text into drivers.
///
/// A header with no data rows is an empty, valid upload. Driver ids are unique
/// within one upload.
pub fn read_drivers_from_csv_string(csv_content: &str) -> Result<CsvUpload, IngestError> {
    if csv_content.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(csv_content.as_bytes());

    let header_record = reader.headers()?.clone();
    let columns = Columns::new(&header_record);

    let mut seen_ids = HashSet::new();
    let mut upload = CsvUpload {
        headers: header_record.iter().map(str::to_string).collect(),
        ..CsvUpload::default()
    };

    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = RowReader {
            columns: &columns,
            record: &record,
            line,
        };
        let mut driver = row.driver(upload.rows.len());
        claim_unique_id(&mut driver, &mut seen_ids, line);
        upload.drivers.push(driver);
        upload.rows.push(record.iter().map(str::to_string).collect());
    }

    info!("Successfully loaded {} drivers from CSV content", upload.drivers.len());
    Ok(upload)
}

/// The built-in three-driver sample set.
pub fn sample_drivers() -> Vec<Driver> {
    read_drivers_from_csv_string(SAMPLE_CSV)
        .map(|upload| upload.drivers)
        .unwrap_or_default()
}
