//! Trading-calendar alignment.
//!
//! Maps an arbitrary calendar date (weekend, holiday, release date) onto the
//! nearest observation of an irregular daily series.
//!
//! # Tie-break
//!
//! When the target sits exactly between two observations (e.g. a Sunday
//! between a Friday close and a Tuesday reopen after a Monday holiday), the
//! **earlier** observation wins. This rule decides which trading day "is" the event day,
//! so it is fixed here and covered by tests.

use chrono::NaiveDate;
use evs_schemas::Observation;

/// Anything carrying a calendar date. Inputs must be strictly increasing by
/// date; that precondition is validated upstream (see `TimeSeries::new`).
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}

impl Dated for Observation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Index of the observation nearest to `target` by absolute calendar distance.
///
/// Returns `None` only for an empty input. For non-empty input the result is
/// always in `[0, len)`.
pub fn nearest_position<T: Dated>(items: &[T], target: NaiveDate) -> Option<usize> {
    if items.is_empty() {
        return None;
    }

    // First index whose date is >= target.
    let right = items.partition_point(|it| it.date() < target);

    if right == 0 {
        return Some(0);
    }
    if right == items.len() {
        return Some(items.len() - 1);
    }

    let left = right - 1;
    let dist_left = (target - items[left].date()).num_days();
    let dist_right = (items[right].date() - target).num_days();

    if dist_left <= dist_right {
        Some(left)
    } else {
        Some(right)
    }
}
