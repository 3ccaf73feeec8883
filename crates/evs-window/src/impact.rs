//! Event-day impact versus a trailing "typical day" baseline.
//!
//! baseline     = median |ret| over `[max(0, p - baseline_window), p)`
//! impact_ratio = |ret_p| / baseline, NaN when baseline == 0

use chrono::NaiveDate;
use evs_schemas::{Event, ImpactRow, Observation, TimeSeries};

use crate::align::nearest_position;
use crate::summary::median;
use crate::SkipReason;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDayImpact {
    pub event_day_ret: f64,
    pub event_day_abs: f64,
    /// Median absolute return of the trailing window.
    pub baseline_abs: f64,
    /// NaN when `baseline_abs == 0.0`.
    pub impact_ratio: f64,
}

impl EventDayImpact {
    pub fn to_row(&self, symbol: &str, event: &Event) -> ImpactRow {
        ImpactRow {
            symbol: symbol.to_string(),
            event: event.name.clone(),
            event_date: event.date,
            event_day_ret: self.event_day_ret,
            event_day_abs: self.event_day_abs,
            baseline_abs20: self.baseline_abs,
            impact_ratio: self.impact_ratio,
        }
    }
}

/// Impact of the observation at `p` relative to the `baseline_window` before it.
///
/// `p == 0` has no history and is rejected with the window extractor's
/// start-of-series rule.
pub fn event_day_impact(
    obs: &[Observation],
    p: usize,
    baseline_window: usize,
) -> Result<EventDayImpact, SkipReason> {
    if p == 0 {
        return Err(SkipReason::EventAtSeriesStart);
    }
    let day = obs.get(p).ok_or(SkipReason::UnresolvableAlignment)?;

    let trailing = &obs[p.saturating_sub(baseline_window)..p];
    if trailing.is_empty() {
        return Err(SkipReason::EmptyBaseline);
    }

    let abs: Vec<f64> = trailing.iter().map(|o| o.ret.abs()).collect();
    let baseline_abs = median(&abs);

    let event_day_abs = day.ret.abs();
    let impact_ratio = if baseline_abs > 0.0 {
        event_day_abs / baseline_abs
    } else {
        f64::NAN
    };

    Ok(EventDayImpact {
        event_day_ret: day.ret,
        event_day_abs,
        baseline_abs,
        impact_ratio,
    })
}

/// Align `date` on `series` and compute the event-day impact.
pub fn event_day_impact_around(
    series: &TimeSeries,
    date: NaiveDate,
    baseline_window: usize,
) -> Result<EventDayImpact, SkipReason> {
    let obs = series.observations();
    let p = nearest_position(obs, date).ok_or(SkipReason::UnresolvableAlignment)?;
    event_day_impact(obs, p, baseline_window)
}
