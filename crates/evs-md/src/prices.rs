use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use evs_schemas::{Observation, SeriesError, TimeSeries};

use crate::{parse_date, parse_opt_f64, read_lowercase_csv, LoadError};

/// Cache file suffix: `<SYMBOL_WITH_UNDERSCORES>_daily.csv`.
pub const CACHE_SUFFIX: &str = "_daily.csv";

/// `SPY.US` -> `SPY_US_daily.csv`
pub fn cache_file_name(symbol: &str) -> String {
    format!("{}{CACHE_SUFFIX}", symbol.replace('.', "_"))
}

pub fn cache_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(cache_file_name(symbol))
}

/// `SPY_US_daily.csv` -> `SPY.US`. `None` for anything else.
pub fn symbol_from_file_name(name: &str) -> Option<String> {
    let stem = name.strip_suffix(CACHE_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace('_', "."))
}

/// Symbols with a cache file in `data_dir`, sorted.
pub fn discover_symbols(data_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("read data dir: {}", data_dir.display()))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read data dir: {}", data_dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(sym) = entry.file_name().to_str().and_then(symbol_from_file_name) {
            out.push(sym);
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// One parsed row in file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    /// 1-based file line.
    pub line: usize,
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub ret: Option<f64>,
}

/// Parsed cache file before any ordering or return derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    /// True when the file carries a `ret` column; otherwise returns derive from `close`.
    pub has_ret: bool,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    /// `(date, return)` sorted by date (stable). Returns derive from `close`
    /// as `close[t] / close[t-1] - 1` when there is no `ret` column, leaving
    /// the first row without a return. `close[t-1]` is the last finite close,
    /// so a row with a missing close has no return but does not break the next.
    pub fn dated_returns(&self) -> Vec<(NaiveDate, Option<f64>)> {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| r.date);

        if self.has_ret {
            return rows.iter().map(|r| (r.date, r.ret)).collect();
        }

        let mut out = Vec::with_capacity(rows.len());
        let mut prev_close: Option<f64> = None;
        for r in &rows {
            let close = r.close.filter(|c| c.is_finite());
            let ret = match (prev_close, close) {
                (Some(p), Some(c)) => Some(c / p - 1.0),
                _ => None,
            };
            out.push((r.date, ret));
            prev_close = close.or(prev_close);
        }
        out
    }

    /// Validated series: sorted, missing/non-finite returns dropped, duplicate
    /// dates rejected.
    pub fn into_series(self, symbol: &str) -> Result<TimeSeries, LoadError> {
        let dated = self.dated_returns();
        if let Some(w) = dated.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SeriesError::DuplicateDate { date: w[1].0 }.into());
        }
        let obs = dated
            .into_iter()
            .filter_map(|(date, ret)| match ret {
                Some(r) if r.is_finite() => Some(Observation::new(date, r)),
                _ => None,
            })
            .collect();
        Ok(TimeSeries::new(symbol, obs)?)
    }
}

/// Parse cache CSV text. Headers are case-insensitive; `date` plus `ret` or `close`
/// are required, other columns are ignored.
pub fn parse_price_csv<R: std::io::Read>(src: R) -> Result<PriceTable, LoadError> {
    let (headers, records) = read_lowercase_csv(src)?;
    let col = |name: &str| headers.iter().position(|h| h == name);

    let date_i = col("date").ok_or(LoadError::MissingColumn("date"))?;
    let ret_i = col("ret");
    let close_i = col("close");
    if ret_i.is_none() && close_i.is_none() {
        return Err(LoadError::MissingColumn("ret|close"));
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let line = i + 2;
        let raw_date = rec.get(date_i).unwrap_or("");
        if raw_date.is_empty() && rec.iter().all(str::is_empty) {
            continue;
        }
        let date = parse_date(raw_date).ok_or_else(|| LoadError::ParseField {
            row: line,
            field: "date",
            raw: raw_date.to_string(),
        })?;

        let num = |idx: Option<usize>, field: &'static str| -> Result<Option<f64>, LoadError> {
            let Some(idx) = idx else { return Ok(None) };
            let raw = rec.get(idx).unwrap_or("");
            parse_opt_f64(raw).map_err(|_| LoadError::ParseField {
                row: line,
                field,
                raw: raw.to_string(),
            })
        };

        rows.push(PriceRow {
            line,
            date,
            close: num(close_i, "close")?,
            ret: num(ret_i, "ret")?,
        });
    }

    Ok(PriceTable {
        has_ret: ret_i.is_some(),
        rows,
    })
}

pub fn read_price_table(path: &Path) -> Result<PriceTable, LoadError> {
    let file = fs::File::open(path)
        .map_err(|e| LoadError::Io(format!("open '{}': {e}", path.display())))?;
    parse_price_csv(file)
}

/// Read and validate one symbol's cache file.
pub fn load_price_csv(path: &Path, symbol: &str) -> Result<TimeSeries, LoadError> {
    read_price_table(path)?.into_series(symbol)
}
