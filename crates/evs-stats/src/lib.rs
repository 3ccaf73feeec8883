//! evs-stats
//!
//! Cross-event statistics over result rows:
//!
//! 1. Aggregate: rows -> per-(symbol, event) samples, NaN dropped, lexicographic order
//! 2. Test: one-sample two-sided t-test against the kind's null (0 or 1)
//! 3. Render: verdict -> one directional sentence; sentences -> summary document
//!
//! Plus NaN-skipping group medians for console summaries.
//!
//! Pure and deterministic. No IO.

mod aggregate;
mod narrative;
pub mod pyfmt;
mod ttest;

pub use aggregate::{
    aggregate, group_medians, impact_medians, impact_ratio_samples, vol_delta_samples,
    window_stat_medians, Sample,
};
pub use narrative::{
    render, render_summary, summary_lines, NarrativeContext, IMPACT_HEADER, VOL_HEADER,
};
pub use ttest::{one_sample_t_test, test_sample, test_samples, GroupVerdict, TTest, Verdict};

use serde::{Deserialize, Serialize};

/// Default minimum sample size for running a test.
pub const DEFAULT_MIN_N: usize = 5;
/// Default significance threshold (strict `p < alpha`).
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Which statistic a sample holds, and the null it is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TestKind {
    /// `vol_delta` against 0: "no change in volatility".
    VolDelta,
    /// `impact_ratio` against 1: "event day is a typical day".
    ImpactRatio,
}

impl TestKind {
    pub fn null_value(&self) -> f64 {
        match self {
            TestKind::VolDelta => 0.0,
            TestKind::ImpactRatio => 1.0,
        }
    }

    /// Result-table column the sample is drawn from.
    pub fn column(&self) -> &'static str {
        match self {
            TestKind::VolDelta => "vol_delta",
            TestKind::ImpactRatio => "impact_ratio",
        }
    }
}

/// Thresholds for [`test_sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestConfig {
    pub min_n: usize,
    pub alpha: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            min_n: DEFAULT_MIN_N,
            alpha: DEFAULT_ALPHA,
        }
    }
}
