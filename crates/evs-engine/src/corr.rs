use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use evs_schemas::{CorrDeltaMatrix, Event, TimeSeries};
use evs_window::summary::pearson;
use evs_window::{extract_windows, nearest_position, SkipReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrDeltaError {
    NoSeries,
    /// No event with this name in the table.
    NoAnchor { event: String },
    /// Symbols share no common dates.
    EmptyPanel,
    /// Anchor aligned too close to either end of the panel.
    Window(SkipReason),
}

impl fmt::Display for CorrDeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrDeltaError::NoSeries => write!(f, "no series loaded"),
            CorrDeltaError::NoAnchor { event } => write!(f, "no '{event}' event to anchor on"),
            CorrDeltaError::EmptyPanel => write!(f, "series share no common dates"),
            CorrDeltaError::Window(r) => write!(f, "insufficient pre/post data: {r}"),
        }
    }
}

impl std::error::Error for CorrDeltaError {}

/// Returns of several symbols on their common dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPanel {
    /// Sorted, unique.
    pub symbols: Vec<String>,
    /// Dates present in every series, increasing.
    pub dates: Vec<NaiveDate>,
    /// `columns[i][t]`: return of `symbols[i]` on `dates[t]`.
    pub columns: Vec<Vec<f64>>,
}

/// Inner join on date. A symbol appearing twice keeps its first series.
pub fn inner_join_returns(series: &[TimeSeries]) -> ReturnPanel {
    let mut by_symbol: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for s in series {
        by_symbol
            .entry(s.symbol())
            .or_insert_with(|| s.observations().iter().map(|o| (o.date, o.ret)).collect());
    }

    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for m in by_symbol.values() {
        let dates: BTreeSet<NaiveDate> = m.keys().copied().collect();
        common = Some(match common {
            None => dates,
            Some(c) => c.intersection(&dates).copied().collect(),
        });
    }
    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

    let columns = by_symbol
        .values()
        .map(|m| dates.iter().filter_map(|d| m.get(d).copied()).collect())
        .collect();

    ReturnPanel {
        symbols: by_symbol.keys().map(|s| s.to_string()).collect(),
        dates,
        columns,
    }
}

/// Correlation matrix post minus pre, around the latest `event_name` event.
///
/// Pre/post windows hold `window` panel rows each side of the aligned
/// position, with the same edge policy as the per-event windows.
pub fn correlation_delta(
    series: &[TimeSeries],
    events: &[Event],
    event_name: &str,
    window: usize,
) -> Result<CorrDeltaMatrix, CorrDeltaError> {
    if series.is_empty() {
        return Err(CorrDeltaError::NoSeries);
    }
    let anchor = events
        .iter()
        .filter(|e| e.name == event_name)
        .map(|e| e.date)
        .max()
        .ok_or_else(|| CorrDeltaError::NoAnchor {
            event: event_name.to_string(),
        })?;

    let panel = inner_join_returns(series);
    let p = nearest_position(&panel.dates, anchor).ok_or(CorrDeltaError::EmptyPanel)?;
    let w = extract_windows(&panel.dates, p, window, window).map_err(CorrDeltaError::Window)?;
    let pre_range = (p - w.pre.len())..p;
    let post_range = (p + 1)..(p + 1 + w.post.len());

    let k = panel.symbols.len();
    let mut values = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in 0..k {
            let (ci, cj) = (&panel.columns[i], &panel.columns[j]);
            let pre = pearson(&ci[pre_range.clone()], &cj[pre_range.clone()]);
            let post = pearson(&ci[post_range.clone()], &cj[post_range.clone()]);
            values[i][j] = post - pre;
        }
    }

    Ok(CorrDeltaMatrix {
        event: event_name.to_string(),
        anchor_date: anchor,
        symbols: panel.symbols,
        values,
        pre_n: w.pre.len(),
        post_n: w.post.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evs_schemas::Observation;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ts(sym: &str, pts: &[(u32, f64)]) -> TimeSeries {
        TimeSeries::new(sym, pts.iter().map(|(day, r)| Observation::new(d(*day), *r)).collect()).unwrap()
    }

    #[test]
    fn join_keeps_common_dates_sorted_by_symbol() {
        let a = ts("B", &[(1, 0.1), (2, 0.2), (3, 0.3)]);
        let b = ts("A", &[(2, 1.0), (3, 2.0), (4, 3.0)]);
        let p = inner_join_returns(&[a, b]);
        assert_eq!(p.symbols, vec!["A", "B"]);
        assert_eq!(p.dates, vec![d(2), d(3)]);
        assert_eq!(p.columns[0], vec![1.0, 2.0]);
        assert_eq!(p.columns[1], vec![0.2, 0.3]);
    }

    #[test]
    fn missing_anchor_is_error() {
        let a = ts("A", &[(1, 0.1), (2, 0.2)]);
        let err = correlation_delta(&[a], &[Event::new("NFP", d(2))], "CPI", 20).unwrap_err();
        assert_eq!(err, CorrDeltaError::NoAnchor { event: "CPI".into() });
    }

    #[test]
    fn anchor_at_panel_start_rejected() {
        let a = ts("A", &[(2, 0.1), (3, 0.2), (4, 0.3)]);
        let err = correlation_delta(&[a], &[Event::new("CPI", d(1))], "CPI", 20).unwrap_err();
        assert_eq!(err, CorrDeltaError::Window(SkipReason::EventAtSeriesStart));
    }

    #[test]
    fn disjoint_series_have_empty_panel() {
        let a = ts("A", &[(1, 0.1), (2, 0.2)]);
        let b = ts("B", &[(3, 0.1), (4, 0.2)]);
        let err = correlation_delta(&[a, b], &[Event::new("CPI", d(2))], "CPI", 20).unwrap_err();
        assert_eq!(err, CorrDeltaError::EmptyPanel);
    }
}
