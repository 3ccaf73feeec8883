//! Scenario: window edge policy over real-shaped series
//!
//! GREEN when:
//! - An event before the first observation aligns to position 0 and is skipped
//!   with EVENT_AT_SERIES_START (for both windows and impact).
//! - An event after the last observation is skipped with EMPTY_POST_WINDOW.
//! - An empty series is UNRESOLVABLE_ALIGNMENT.
//! - One-observation windows yield NaN volatility without faulting.
//! - vol_delta is exactly post_vol - pre_vol for every event in a noisy series.

use evs_schemas::TimeSeries;
use evs_testkit::{business_days, series_from_returns, seeded_returns, ymd};
use evs_window::{event_day_impact_around, window_stats_around, SkipReason};

#[test]
fn event_before_series_start_is_skipped() {
    let s = series_from_returns("A", ymd(2024, 3, 1), &seeded_returns(1, 30, 0.02)).unwrap();
    assert_eq!(
        window_stats_around(&s, ymd(2023, 1, 1), 5, 5),
        Err(SkipReason::EventAtSeriesStart)
    );
    assert_eq!(
        event_day_impact_around(&s, ymd(2023, 1, 1), 20),
        Err(SkipReason::EventAtSeriesStart)
    );
}

#[test]
fn event_after_series_end_is_skipped() {
    let s = series_from_returns("A", ymd(2024, 3, 1), &seeded_returns(2, 30, 0.02)).unwrap();
    let err = window_stats_around(&s, ymd(2030, 1, 1), 5, 5).unwrap_err();
    assert_eq!(err, SkipReason::EmptyPostWindow);
    assert!(err.is_insufficient_window());
}

#[test]
fn empty_series_is_unresolvable() {
    let s = TimeSeries::new("EMPTY", vec![]).unwrap();
    let err = window_stats_around(&s, ymd(2024, 1, 1), 5, 5).unwrap_err();
    assert_eq!(err, SkipReason::UnresolvableAlignment);
    assert!(!err.is_insufficient_window());
    assert_eq!(err.to_string(), "UNRESOLVABLE_ALIGNMENT");
}

#[test]
fn single_observation_windows_give_nan_vol() {
    let s = series_from_returns("A", ymd(2024, 1, 2), &[0.01, 0.02, -0.01]).unwrap();
    let st = window_stats_around(&s, ymd(2024, 1, 3), 5, 5).unwrap();
    assert_eq!(st.pre_n, 1);
    assert_eq!(st.post_n, 1);
    assert!(st.pre_vol.is_nan());
    assert!(st.post_vol.is_nan());
    assert!(st.vol_delta.is_nan());
    assert!((st.ret_delta - (-0.02)).abs() < 1e-15);
}

#[test]
fn vol_delta_is_exact_difference_everywhere() {
    let start = ymd(2022, 1, 3);
    let s = series_from_returns("NOISY", start, &seeded_returns(42, 250, 0.03)).unwrap();
    for d in business_days(start, 250).into_iter().step_by(7) {
        if let Ok(st) = window_stats_around(&s, d, 5, 5) {
            assert_eq!(st.vol_delta.to_bits(), (st.post_vol - st.pre_vol).to_bits());
            assert_eq!(st.ret_delta.to_bits(), (st.post_mean - st.pre_mean).to_bits());
        }
    }
}

#[test]
fn impact_ratio_from_known_baseline() {
    let rets = [0.01, -0.01, 0.02, -0.02, 0.01, 0.03];
    let s = series_from_returns("B", ymd(2024, 1, 2), &rets).unwrap();
    let event_day = business_days(ymd(2024, 1, 2), 6)[5];
    let imp = event_day_impact_around(&s, event_day, 20).unwrap();
    assert_eq!(imp.baseline_abs, 0.01);
    assert!((imp.impact_ratio - 3.0).abs() < 1e-12);
}
