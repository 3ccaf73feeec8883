//! Data-quality report over cached price files.
//!
//! Inspects files as written (file order, before sorting or validation):
//! - row count and usable (finite-return) observation count
//! - rows dropped for a missing or non-finite return
//! - duplicate dates
//! - monotonicity violations (a date not after its predecessor in file order)
//! - earliest / latest date
//!
//! Files that fail to parse are listed with their error instead of aborting
//! the whole report.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::prices::{cache_path, discover_symbols, read_price_table, PriceTable};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuality {
    pub symbol: String,
    pub total_rows: usize,
    pub usable_rows: usize,
    pub dropped_rows: usize,
    /// Dates appearing more than once, with their count. Sorted.
    pub duplicate_dates: Vec<(NaiveDate, usize)>,
    /// `(previous, offending)` pairs in file order.
    pub monotonicity_violations: Vec<(NaiveDate, NaiveDate)>,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl SeriesQuality {
    pub fn is_clean(&self) -> bool {
        self.duplicate_dates.is_empty() && self.monotonicity_violations.is_empty()
    }
}

/// Quality of one parsed table.
pub fn series_quality(symbol: &str, table: &PriceTable) -> SeriesQuality {
    let rows = &table.rows;

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in rows {
        *counts.entry(r.date).or_default() += 1;
    }
    let duplicate_dates = counts.into_iter().filter(|(_, c)| *c > 1).collect();

    let monotonicity_violations = rows
        .windows(2)
        .filter(|w| w[1].date <= w[0].date)
        .map(|w| (w[0].date, w[1].date))
        .collect();

    let usable_rows = table
        .dated_returns()
        .iter()
        .filter(|(_, r)| r.is_some_and(f64::is_finite))
        .count();

    SeriesQuality {
        symbol: symbol.to_string(),
        total_rows: rows.len(),
        usable_rows,
        dropped_rows: rows.len() - usable_rows,
        duplicate_dates,
        monotonicity_violations,
        earliest: rows.iter().map(|r| r.date).min(),
        latest: rows.iter().map(|r| r.date).max(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    /// Sorted by symbol.
    pub series: Vec<SeriesQuality>,
    /// `(symbol, error)` for files that could not be parsed.
    pub unreadable: Vec<(String, String)>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty() && self.series.iter().all(SeriesQuality::is_clean)
    }
}

fn opt_date(d: Option<NaiveDate>) -> String {
    d.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QualityReport {{")?;
        writeln!(f, "  series: {}", self.series.len())?;
        for s in &self.series {
            writeln!(
                f,
                "  {} rows={} usable={} dropped={} earliest={} latest={}",
                s.symbol,
                s.total_rows,
                s.usable_rows,
                s.dropped_rows,
                opt_date(s.earliest),
                opt_date(s.latest)
            )?;
            for (d, c) in &s.duplicate_dates {
                writeln!(f, "    duplicate date={d} count={c}")?;
            }
            for (prev, d) in &s.monotonicity_violations {
                writeln!(f, "    non-monotonic date={d} prev={prev}")?;
            }
        }
        writeln!(f, "  unreadable: {}", self.unreadable.len())?;
        for (sym, err) in &self.unreadable {
            writeln!(f, "    {sym}: {err}")?;
        }
        write!(f, "}}")
    }
}

/// Report on every cache file in `data_dir`.
///
/// Errors only when the directory itself cannot be read.
pub fn build_quality_report(data_dir: &Path) -> Result<QualityReport> {
    let mut report = QualityReport::default();
    for sym in discover_symbols(data_dir)? {
        match read_price_table(&cache_path(data_dir, &sym)) {
            Ok(table) => report.series.push(series_quality(&sym, &table)),
            Err(e) => report.unreadable.push((sym, e.to_string())),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::parse_price_csv;

    #[test]
    fn clean_table() {
        let t = parse_price_csv("date,ret\n2024-01-02,0.01\n2024-01-03,0.02\n".as_bytes()).unwrap();
        let q = series_quality("A", &t);
        assert!(q.is_clean());
        assert_eq!(q.total_rows, 2);
        assert_eq!(q.usable_rows, 2);
        assert_eq!(q.dropped_rows, 0);
        assert_eq!(q.earliest, NaiveDate::from_ymd_opt(2024, 1, 2));
    }

    #[test]
    fn flags_duplicates_ordering_and_drops() {
        let src = "date,ret\n2024-01-03,0.01\n2024-01-02,\n2024-01-03,0.02\n2024-01-04,nan\n";
        let t = parse_price_csv(src.as_bytes()).unwrap();
        let q = series_quality("A", &t);
        assert!(!q.is_clean());
        let jan3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(q.duplicate_dates, vec![(jan3, 2)]);
        assert_eq!(q.monotonicity_violations.len(), 1);
        assert_eq!(q.usable_rows, 2);
        assert_eq!(q.dropped_rows, 2);
    }

    #[test]
    fn close_only_drops_first_row() {
        let t = parse_price_csv("date,close\n2024-01-02,10\n2024-01-03,11\n".as_bytes()).unwrap();
        let q = series_quality("A", &t);
        assert_eq!(q.usable_rows, 1);
        assert_eq!(q.dropped_rows, 1);
    }
}
