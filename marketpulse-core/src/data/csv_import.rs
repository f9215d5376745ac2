//! Offline equity provider backed by CSV exports.
//!
//! Looks for `{dir}/{ticker}.csv`, then the same name without a leading `^`.
//! Header names are matched case-insensitively (`Date`, `open`, `CLOSE`, ...);
//! extra columns such as `Adj Close` are ignored.

use super::error::DataError;
use super::feed::EquityRow;
use super::provider::EquityProvider;
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};

const REQUIRED: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvEquityProvider {
    dir: PathBuf,
}

impl CsvEquityProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> Option<PathBuf> {
        [ticker, ticker.trim_start_matches('^')]
            .iter()
            .map(|name| self.dir.join(format!("{name}.csv")))
            .find(|p| p.exists())
    }
}

fn csv_error(path: &Path, reason: impl ToString) -> DataError {
    DataError::Csv {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Accept "2024-01-02" and timestamped exports like "2024-01-02 00:00:00-05:00"
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_cell(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.replace(',', "").parse::<f64>().ok())
}

/// Read every row of an equity CSV file.
pub fn read_equity_csv(path: &Path) -> Result<Vec<EquityRow>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut index = [0usize; 6];
    for (slot, name) in index.iter_mut().zip(REQUIRED) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| csv_error(path, format!("missing column '{name}'")))?;
    }
    let [date_i, open_i, high_i, low_i, close_i, volume_i] = index;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let Some(date) = record.get(date_i).and_then(parse_date) else {
            tracing::warn!(path = %path.display(), line = line + 2, "skipping csv row with unparsable date");
            continue;
        };
        rows.push(EquityRow {
            date,
            open: parse_cell(record.get(open_i)),
            high: parse_cell(record.get(high_i)),
            low: parse_cell(record.get(low_i)),
            close: parse_cell(record.get(close_i)),
            volume: parse_cell(record.get(volume_i)),
        });
    }

    Ok(rows)
}

impl EquityProvider for CsvEquityProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    /// Rows within `days` calendar days of the latest row in the file.
    fn fetch_daily(&self, ticker: &str, days: u32) -> Result<Vec<EquityRow>, DataError> {
        let path = self.path_for(ticker).ok_or_else(|| DataError::SymbolNotFound {
            symbol: ticker.to_string(),
        })?;
        let rows = read_equity_csv(&path)?;

        let Some(latest) = rows.iter().map(|r| r.date).max() else {
            return Ok(rows);
        };
        // a window reaching past the calendar's start keeps every row
        match latest.checked_sub_days(Days::new(days.into())) {
            Some(cutoff) => Ok(rows.into_iter().filter(|r| r.date > cutoff).collect()),
            None => Ok(rows),
        }
    }
}
