//! Pre/post window extraction and window statistics.

use chrono::NaiveDate;
use evs_schemas::{Event, Observation, TimeSeries, WindowStatRow};

use crate::align::nearest_position;
use crate::summary::{mean, sample_std};
use crate::SkipReason;

/// Borrowed pre/post slices around an aligned position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPair<'a, T> {
    /// Aligned event-day index (excluded from both windows).
    pub position: usize,
    pub pre: &'a [T],
    pub post: &'a [T],
}

/// Slice `[max(0, p - pre_days), p)` and `[p + 1, min(len, p + 1 + post_days))`.
///
/// Rejections:
/// - `p == 0` -> [`SkipReason::EventAtSeriesStart`], even when a post window exists
/// - empty pre -> [`SkipReason::EmptyPreWindow`] (only reachable with `pre_days == 0`)
/// - empty post -> [`SkipReason::EmptyPostWindow`]
///
/// A `p` past the end of `items` is treated as an empty post window.
pub fn extract_windows<T>(
    items: &[T],
    p: usize,
    pre_days: usize,
    post_days: usize,
) -> Result<WindowPair<'_, T>, SkipReason> {
    if p == 0 {
        return Err(SkipReason::EventAtSeriesStart);
    }
    let len = items.len();
    if p >= len {
        return Err(SkipReason::EmptyPostWindow);
    }

    let pre = &items[p.saturating_sub(pre_days)..p];
    let post_end = len.min(p.saturating_add(1).saturating_add(post_days));
    let post = &items[p + 1..post_end];

    if pre.is_empty() {
        return Err(SkipReason::EmptyPreWindow);
    }
    if post.is_empty() {
        return Err(SkipReason::EmptyPostWindow);
    }

    Ok(WindowPair {
        position: p,
        pre,
        post,
    })
}

/// Volatility and mean return of a pre/post window pair.
///
/// Fields are finite or NaN; a 1-observation window has NaN volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub pre_vol: f64,
    pub post_vol: f64,
    pub vol_delta: f64,
    pub pre_mean: f64,
    pub post_mean: f64,
    pub ret_delta: f64,
    pub pre_n: usize,
    pub post_n: usize,
}

impl WindowStats {
    pub fn to_row(&self, symbol: &str, event: &Event) -> WindowStatRow {
        WindowStatRow {
            symbol: symbol.to_string(),
            event: event.name.clone(),
            event_date: event.date,
            pre_vol: self.pre_vol,
            post_vol: self.post_vol,
            vol_delta: self.vol_delta,
            pre_mean: self.pre_mean,
            post_mean: self.post_mean,
            ret_delta: self.ret_delta,
            pre_n: self.pre_n,
            post_n: self.post_n,
        }
    }
}

/// Reduce two windows to volatility/mean and their post-minus-pre deltas.
pub fn window_stats(pre: &[Observation], post: &[Observation]) -> WindowStats {
    let pre_r: Vec<f64> = pre.iter().map(|o| o.ret).collect();
    let post_r: Vec<f64> = post.iter().map(|o| o.ret).collect();

    let pre_vol = sample_std(&pre_r);
    let post_vol = sample_std(&post_r);
    let pre_mean = mean(&pre_r);
    let post_mean = mean(&post_r);

    WindowStats {
        pre_vol,
        post_vol,
        vol_delta: post_vol - pre_vol,
        pre_mean,
        post_mean,
        ret_delta: post_mean - pre_mean,
        pre_n: pre_r.len(),
        post_n: post_r.len(),
    }
}

/// Align `date` on `series`, extract windows, and reduce them.
pub fn window_stats_around(
    series: &TimeSeries,
    date: NaiveDate,
    pre_days: usize,
    post_days: usize,
) -> Result<WindowStats, SkipReason> {
    let obs = series.observations();
    let p = nearest_position(obs, date).ok_or(SkipReason::UnresolvableAlignment)?;
    let w = extract_windows(obs, p, pre_days, post_days)?;
    Ok(window_stats(w.pre, w.post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_zero_always_rejected() {
        let items: Vec<u32> = (0..50).collect();
        for post in [0usize, 1, 5, 40] {
            assert_eq!(
                extract_windows(&items, 0, 5, post),
                Err(SkipReason::EventAtSeriesStart)
            );
        }
    }

    #[test]
    fn event_day_excluded_from_both_windows() {
        let items: Vec<u32> = (0..20).collect();
        let w = extract_windows(&items, 10, 5, 5).unwrap();
        assert_eq!(w.pre, &[5, 6, 7, 8, 9]);
        assert_eq!(w.post, &[11, 12, 13, 14, 15]);
        assert_eq!(w.position, 10);
    }

    #[test]
    fn pre_window_truncated_at_series_start() {
        let items: Vec<u32> = (0..20).collect();
        let w = extract_windows(&items, 2, 5, 5).unwrap();
        assert_eq!(w.pre, &[0, 1]);
        assert_eq!(w.post.len(), 5);
    }

    #[test]
    fn post_window_truncated_at_series_end() {
        let items: Vec<u32> = (0..20).collect();
        let w = extract_windows(&items, 17, 5, 5).unwrap();
        assert_eq!(w.post, &[18, 19]);
    }

    #[test]
    fn event_on_last_observation_rejected() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(
            extract_windows(&items, 19, 5, 5),
            Err(SkipReason::EmptyPostWindow)
        );
    }

    #[test]
    fn zero_length_windows_rejected() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(extract_windows(&items, 10, 0, 5), Err(SkipReason::EmptyPreWindow));
        assert_eq!(extract_windows(&items, 10, 5, 0), Err(SkipReason::EmptyPostWindow));
    }

    #[test]
    fn huge_window_lengths_clamp_to_series() {
        let items: Vec<u32> = (0..20).collect();
        let w = extract_windows(&items, 10, usize::MAX, usize::MAX).unwrap();
        assert_eq!(w.pre.len(), 10);
        assert_eq!(w.post, &[11, 12, 13, 14, 15, 16, 17, 18, 19]);
    }

    #[test]
    fn position_past_end_rejected() {
        let items: Vec<u32> = (0..3).collect();
        assert_eq!(extract_windows(&items, 7, 5, 5), Err(SkipReason::EmptyPostWindow));
    }
}
