//! evs-schemas
//!
//! Shared data contracts for the event study workspace.
//!
//! - [`TimeSeries`]: one symbol's daily returns, strictly increasing by date.
//! - [`Event`]: a dated macro announcement (CPI, NFP, ...).
//! - [`WindowStatRow`] / [`ImpactRow`]: one computed record per
//!   (symbol, event name, event date).
//! - [`CorrDeltaMatrix`], [`GroupMedian`]: summary products.
//!
//! No IO and no numerical logic lives here.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// A single daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Simple daily return (e.g. 0.01 = +1%). Always finite inside a [`TimeSeries`].
    pub ret: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, ret: f64) -> Self {
        Self { date, ret }
    }
}

/// Why a candidate series was rejected by [`TimeSeries::new`].
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// `date` does not come after `prev` (index is the offending position).
    OutOfOrder {
        index: usize,
        prev: NaiveDate,
        date: NaiveDate,
    },
    /// Same date appears twice.
    DuplicateDate { date: NaiveDate },
    /// NaN or infinite return.
    NonFiniteReturn { date: NaiveDate, value: f64 },
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::OutOfOrder { index, prev, date } => {
                write!(f, "dates not increasing at index {index}: {prev} then {date}")
            }
            SeriesError::DuplicateDate { date } => write!(f, "duplicate date: {date}"),
            SeriesError::NonFiniteReturn { date, value } => {
                write!(f, "non-finite return on {date}: {value}")
            }
        }
    }
}

impl std::error::Error for SeriesError {}

/// Ordered daily return series for one symbol.
///
/// Invariants (checked at construction):
/// - dates strictly increasing (no duplicates)
/// - every return finite
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    symbol: String,
    obs: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(symbol: impl Into<String>, obs: Vec<Observation>) -> Result<Self, SeriesError> {
        for (i, o) in obs.iter().enumerate() {
            if !o.ret.is_finite() {
                return Err(SeriesError::NonFiniteReturn {
                    date: o.date,
                    value: o.ret,
                });
            }
            if i > 0 {
                let prev = obs[i - 1].date;
                if o.date == prev {
                    return Err(SeriesError::DuplicateDate { date: o.date });
                }
                if o.date < prev {
                    return Err(SeriesError::OutOfOrder {
                        index: i,
                        prev,
                        date: o.date,
                    });
                }
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            obs,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn observations(&self) -> &[Observation] {
        &self.obs
    }

    pub fn len(&self) -> usize {
        self.obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.obs.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.obs.last().map(|o| o.date)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A scheduled macro announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Category label, e.g. "CPI" or "NFP".
    #[serde(rename = "event")]
    pub name: String,
    #[serde(rename = "event_date")]
    pub date: NaiveDate,
    /// Released figure (YoY %, payroll level, ...). Informational only.
    #[serde(default, deserialize_with = "opt_f64_or_empty")]
    pub value: Option<f64>,
}

impl Event {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// Common key accessors for result rows.
///
/// Rows are grouped by `(symbol, event)` and canonically sorted by
/// `(symbol, event, event_date)`.
pub trait ResultRow {
    fn symbol(&self) -> &str;
    fn event(&self) -> &str;
    fn event_date(&self) -> NaiveDate;

    fn sort_key(&self) -> (&str, &str, NaiveDate) {
        (self.symbol(), self.event(), self.event_date())
    }
}

/// Pre/post window statistics around one event for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStatRow {
    pub symbol: String,
    pub event: String,
    pub event_date: NaiveDate,
    #[serde(deserialize_with = "f64_or_nan")]
    pub pre_vol: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub post_vol: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub vol_delta: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub pre_mean: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub post_mean: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub ret_delta: f64,
    /// Observations in the pre window.
    #[serde(default)]
    pub pre_n: usize,
    /// Observations in the post window.
    #[serde(default)]
    pub post_n: usize,
}

impl ResultRow for WindowStatRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }
    fn event(&self) -> &str {
        &self.event
    }
    fn event_date(&self) -> NaiveDate {
        self.event_date
    }
}

/// Event-day absolute move versus the trailing baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRow {
    pub symbol: String,
    pub event: String,
    pub event_date: NaiveDate,
    #[serde(deserialize_with = "f64_or_nan")]
    pub event_day_ret: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub event_day_abs: f64,
    #[serde(deserialize_with = "f64_or_nan")]
    pub baseline_abs20: f64,
    /// NaN when the baseline is exactly zero.
    #[serde(deserialize_with = "f64_or_nan")]
    pub impact_ratio: f64,
}

impl ResultRow for ImpactRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }
    fn event(&self) -> &str {
        &self.event
    }
    fn event_date(&self) -> NaiveDate {
        self.event_date
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Median of one or more statistics for a `(symbol, event)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMedian {
    pub symbol: String,
    pub event: String,
    /// Rows contributing (before NaN filtering).
    pub rows: usize,
    /// `(statistic name, median)` in the order requested.
    pub medians: Vec<(String, f64)>,
}

/// Post-minus-pre correlation matrix around one anchor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrDeltaMatrix {
    pub event: String,
    pub anchor_date: NaiveDate,
    /// Row/column labels, sorted.
    pub symbols: Vec<String>,
    /// `values[i][j] = corr_post(i, j) - corr_pre(i, j)`.
    pub values: Vec<Vec<f64>>,
    pub pre_n: usize,
    pub post_n: usize,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Empty cells read back as NaN.
fn f64_or_nan<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(de)?;
    let t = raw.trim();
    if t.is_empty() {
        return Ok(f64::NAN);
    }
    t.parse::<f64>().map_err(serde::de::Error::custom)
}

fn opt_f64_or_empty<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => t.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}
