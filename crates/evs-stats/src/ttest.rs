use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use evs_window::summary::{mean, sample_variance};

use crate::aggregate::Sample;
use crate::{TestConfig, TestKind};

/// Raw one-sample t-test output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub mean: f64,
    pub statistic: f64,
    /// Two-sided.
    pub p_value: f64,
    pub df: usize,
}

/// Two-sided one-sample Student's t-test of `values` against `null`.
///
/// `t = (mean - null) / sqrt(var / n)` with sample variance (n - 1), df = n - 1.
/// Zero variance does not fault: `t` is NaN when the mean equals the null
/// (p NaN) and +/-inf otherwise (p 0). Fewer than 2 values give NaN t and p.
pub fn one_sample_t_test(values: &[f64], null: f64) -> TTest {
    let n = values.len();
    let m = mean(values);
    let df = n.saturating_sub(1);
    if n < 2 {
        return TTest {
            mean: m,
            statistic: f64::NAN,
            p_value: f64::NAN,
            df,
        };
    }

    let d = m - null;
    let se = (sample_variance(values) / n as f64).sqrt();
    let statistic = d / se;

    let p_value = if statistic.is_nan() {
        f64::NAN
    } else if statistic.is_infinite() {
        0.0
    } else {
        match StudentsT::new(0.0, 1.0, df as f64) {
            Ok(dist) => (2.0 * dist.sf(statistic.abs())).min(1.0),
            Err(_) => f64::NAN,
        }
    };

    TTest {
        mean: m,
        statistic,
        p_value,
        df,
    }
}

/// Outcome of testing one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Tested {
        mean: f64,
        n: usize,
        statistic: f64,
        p_value: f64,
        /// `p_value < alpha`; false when p is NaN.
        significant: bool,
    },
    /// Fewer than `min_n` values; no statistic computed.
    Insufficient { n: usize },
}

impl Verdict {
    pub fn n(&self) -> usize {
        match self {
            Verdict::Tested { n, .. } | Verdict::Insufficient { n } => *n,
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Verdict::Tested { significant: true, .. })
    }
}

/// A verdict with the group and statistic it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupVerdict {
    pub symbol: String,
    pub event: String,
    pub kind: TestKind,
    pub verdict: Verdict,
}

/// Test one sample against `kind`'s null, or report it as insufficient.
pub fn test_sample(values: &[f64], kind: TestKind, cfg: &TestConfig) -> Verdict {
    let n = values.len();
    if n < cfg.min_n {
        return Verdict::Insufficient { n };
    }
    let t = one_sample_t_test(values, kind.null_value());
    Verdict::Tested {
        mean: t.mean,
        n,
        statistic: t.statistic,
        p_value: t.p_value,
        significant: t.p_value < cfg.alpha,
    }
}

/// Test every sample, preserving their order.
pub fn test_samples(samples: &[Sample], kind: TestKind, cfg: &TestConfig) -> Vec<GroupVerdict> {
    samples
        .iter()
        .map(|s| GroupVerdict {
            symbol: s.symbol.clone(),
            event: s.event.clone(),
            kind,
            verdict: test_sample(&s.values, kind, cfg),
        })
        .collect()
}
