//! evs-md
//!
//! Local market-data boundary: cached per-symbol price files and the event table.
//!
//! - [`discover_symbols`]: `SPY_US_daily.csv` -> `SPY.US`
//! - [`load_price_csv`]: cache file -> validated [`evs_schemas::TimeSeries`]
//! - [`load_events_csv`]: `events.csv` -> `Vec<Event>` (file order)
//! - [`build_quality_report`]: duplicates, ordering, dropped rows per symbol
//!
//! Fetching from remote providers is out of scope; files are produced elsewhere.

mod events;
mod prices;
mod quality;

pub use events::{load_events_csv, parse_events_csv};
pub use prices::{
    cache_file_name, cache_path, discover_symbols, load_price_csv, parse_price_csv,
    read_price_table, symbol_from_file_name, PriceRow, PriceTable, CACHE_SUFFIX,
};
pub use quality::{build_quality_report, series_quality, QualityReport, SeriesQuality};

use std::fmt;

use chrono::NaiveDate;
use evs_schemas::SeriesError;

/// Errors produced while reading cache or event files.
#[derive(Debug)]
pub enum LoadError {
    /// Open/read failure or a malformed CSV record.
    Io(String),
    /// Header row lacks a required column.
    MissingColumn(&'static str),
    /// A field could not be parsed. `row` is the 1-based file line.
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },
    /// Rows parsed but do not form a valid series (e.g. duplicate dates).
    Series(SeriesError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "csv io error: {msg}"),
            LoadError::MissingColumn(col) => write!(f, "csv missing required column: '{col}'"),
            LoadError::ParseField { row, field, raw } => {
                write!(f, "csv row {row}: cannot parse field '{field}' from value '{raw}'")
            }
            LoadError::Series(e) => write!(f, "invalid series: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<SeriesError> for LoadError {
    fn from(e: SeriesError) -> Self {
        LoadError::Series(e)
    }
}

/// `YYYY-MM-DD`, ignoring any time suffix (`2024-01-02 00:00:00`, `2024-01-02T00:00:00Z`).
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    let head = t.get(..10).unwrap_or(t);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Empty cell -> `Ok(None)`; `nan` parses to NaN and is kept for the caller to drop.
pub(crate) fn parse_opt_f64(raw: &str) -> Result<Option<f64>, ()> {
    let t = raw.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<f64>().map(Some).map_err(|_| ())
}

/// Read all records with case-insensitive, trimmed headers.
pub(crate) fn read_lowercase_csv<R: std::io::Read>(
    src: R,
) -> Result<(Vec<String>, Vec<csv::StringRecord>), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(src);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| LoadError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    let mut records = Vec::new();
    for rec in rdr.records() {
        records.push(rec.map_err(|e| LoadError::Io(e.to_string()))?);
    }
    Ok((headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_time_suffix() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_date("2024-01-02"), Some(d));
        assert_eq!(parse_date(" 2024-01-02 00:00:00 "), Some(d));
        assert_eq!(parse_date("2024-01-02T00:00:00Z"), Some(d));
        assert_eq!(parse_date("01/02/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn optional_floats() {
        assert_eq!(parse_opt_f64(""), Ok(None));
        assert_eq!(parse_opt_f64(" 0.5 "), Ok(Some(0.5)));
        assert!(parse_opt_f64("NaN").unwrap().unwrap().is_nan());
        assert!(parse_opt_f64("abc").is_err());
    }
}
