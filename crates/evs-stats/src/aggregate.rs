use std::collections::BTreeMap;

use evs_schemas::{GroupMedian, ImpactRow, ResultRow, WindowStatRow};
use evs_window::summary::median;

/// Non-NaN values of one statistic for one `(symbol, event)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub symbol: String,
    pub event: String,
    /// In input row order.
    pub values: Vec<f64>,
}

impl Sample {
    pub fn n(&self) -> usize {
        self.values.len()
    }
}

/// Group `rows` by `(symbol, event)` and collect `stat` for each row where it is not NaN.
///
/// Groups whose values are all NaN do not appear. Output is ordered by
/// symbol, then event name.
pub fn aggregate<R, F>(rows: &[R], stat: F) -> Vec<Sample>
where
    R: ResultRow,
    F: Fn(&R) -> f64,
{
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for r in rows {
        let v = stat(r);
        if v.is_nan() {
            continue;
        }
        groups.entry((r.symbol(), r.event())).or_default().push(v);
    }
    groups
        .into_iter()
        .map(|((symbol, event), values)| Sample {
            symbol: symbol.to_string(),
            event: event.to_string(),
            values,
        })
        .collect()
}

pub fn vol_delta_samples(rows: &[WindowStatRow]) -> Vec<Sample> {
    aggregate(rows, |r| r.vol_delta)
}

pub fn impact_ratio_samples(rows: &[ImpactRow]) -> Vec<Sample> {
    aggregate(rows, |r| r.impact_ratio)
}

/// Median of each named statistic per `(symbol, event)`, NaN skipped.
///
/// Unlike [`aggregate`], every group with at least one row appears; a
/// statistic with no finite values has a NaN median.
pub fn group_medians<R: ResultRow>(rows: &[R], stats: &[(&str, fn(&R) -> f64)]) -> Vec<GroupMedian> {
    let mut groups: BTreeMap<(&str, &str), Vec<&R>> = BTreeMap::new();
    for r in rows {
        groups.entry((r.symbol(), r.event())).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|((symbol, event), members)| {
            let medians = stats
                .iter()
                .map(|(name, f)| {
                    let vals: Vec<f64> = members.iter().map(|r| f(r)).collect();
                    (name.to_string(), median(&vals))
                })
                .collect();
            GroupMedian {
                symbol: symbol.to_string(),
                event: event.to_string(),
                rows: members.len(),
                medians,
            }
        })
        .collect()
}

/// `vol_delta` and `ret_delta` medians.
pub fn window_stat_medians(rows: &[WindowStatRow]) -> Vec<GroupMedian> {
    let stats: [(&str, fn(&WindowStatRow) -> f64); 2] = [
        ("vol_delta", |r| r.vol_delta),
        ("ret_delta", |r| r.ret_delta),
    ];
    group_medians(rows, &stats)
}

/// `impact_ratio` medians.
pub fn impact_medians(rows: &[ImpactRow]) -> Vec<GroupMedian> {
    let stats: [(&str, fn(&ImpactRow) -> f64); 1] = [("impact_ratio", |r| r.impact_ratio)];
    group_medians(rows, &stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(sym: &str, ev: &str, day: u32, vol_delta: f64) -> WindowStatRow {
        WindowStatRow {
            symbol: sym.into(),
            event: ev.into(),
            event_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            pre_vol: 0.0,
            post_vol: vol_delta,
            vol_delta,
            pre_mean: 0.0,
            post_mean: 0.0,
            ret_delta: 0.0,
            pre_n: 5,
            post_n: 5,
        }
    }

    #[test]
    fn nan_rows_dropped_and_groups_sorted() {
        let rows = vec![
            row("SPY.US", "NFP", 1, 0.1),
            row("QQQ.US", "CPI", 2, f64::NAN),
            row("SPY.US", "CPI", 3, 0.2),
            row("QQQ.US", "CPI", 4, 0.3),
            row("SPY.US", "CPI", 5, 0.4),
        ];
        let s = vol_delta_samples(&rows);
        let keys: Vec<(&str, &str)> = s.iter().map(|x| (x.symbol.as_str(), x.event.as_str())).collect();
        assert_eq!(keys, vec![("QQQ.US", "CPI"), ("SPY.US", "CPI"), ("SPY.US", "NFP")]);
        assert_eq!(s[0].values, vec![0.3]);
        assert_eq!(s[1].values, vec![0.2, 0.4]);
        assert!(s.iter().all(|x| x.values.iter().all(|v| !v.is_nan())));
    }

    #[test]
    fn all_nan_group_vanishes() {
        let rows = vec![row("A", "CPI", 1, f64::NAN), row("A", "CPI", 2, f64::NAN)];
        assert!(vol_delta_samples(&rows).is_empty());
    }

    #[test]
    fn medians_keep_all_nan_groups() {
        let rows = vec![
            row("A", "CPI", 1, f64::NAN),
            row("B", "CPI", 1, 0.1),
            row("B", "CPI", 2, 0.3),
            row("B", "CPI", 3, f64::NAN),
        ];
        let m = window_stat_medians(&rows);
        assert_eq!(m.len(), 2);
        assert!(m[0].medians[0].1.is_nan());
        assert_eq!(m[1].rows, 3);
        assert!((m[1].medians[0].1 - 0.2).abs() < 1e-15);
        assert_eq!(m[1].medians[1], ("ret_delta".to_string(), 0.0));
    }
}
