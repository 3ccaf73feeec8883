use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use evs_config::EngineConfig;
use evs_schemas::{CorrDeltaMatrix, Event, GroupMedian, ImpactRow, ResultRow, TimeSeries, WindowStatRow};
use evs_stats::{
    impact_medians, impact_ratio_samples, render_summary, test_samples, vol_delta_samples,
    window_stat_medians, GroupVerdict, NarrativeContext, TestConfig, TestKind,
};
use evs_window::{event_day_impact_around, window_stats_around, SkipReason};

use crate::corr::{correlation_delta, CorrDeltaError};

/// A (symbol, event) pair that produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub symbol: String,
    pub event: String,
    pub event_date: NaiveDate,
    pub reason: SkipReason,
}

/// Rows of one stage plus the pairs it skipped, both canonically ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<R> {
    pub rows: Vec<R>,
    pub skipped: Vec<Skip>,
}

impl<R> StageOutput<R> {
    /// Skip counts keyed by reason code.
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for s in &self.skipped {
            *out.entry(s.reason.as_str()).or_insert(0) += 1;
        }
        out
    }
}

pub struct StudyEngine {
    config: EngineConfig,
}

impl StudyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn test_config(&self) -> TestConfig {
        TestConfig {
            min_n: self.config.min_n,
            alpha: self.config.alpha,
        }
    }

    pub fn narrative_context(&self) -> NarrativeContext {
        NarrativeContext {
            pre_days: self.config.pre_days,
            post_days: self.config.post_days,
            baseline_window: self.config.baseline_window,
        }
    }

    /// Stable sort by date, then keep the most recent `event_tail` events.
    pub fn prepare_events(&self, events: &[Event]) -> Vec<Event> {
        let mut out = events.to_vec();
        out.sort_by_key(|e| e.date);
        if let Some(tail) = self.config.event_tail {
            let start = out.len().saturating_sub(tail);
            out.drain(..start);
        }
        out
    }

    /// Pre/post window statistics for every (symbol, event) pair.
    pub fn window_stat_rows(&self, series: &[TimeSeries], events: &[Event]) -> StageOutput<WindowStatRow> {
        let (pre, post) = (self.config.pre_days, self.config.post_days);
        self.run_stage("window_stats", series, events, |s, ev| {
            window_stats_around(s, ev.date, pre, post).map(|st| st.to_row(s.symbol(), ev))
        })
    }

    /// Event-day impact for every (symbol, event) pair.
    pub fn impact_rows(&self, series: &[TimeSeries], events: &[Event]) -> StageOutput<ImpactRow> {
        let baseline = self.config.baseline_window;
        self.run_stage("impact", series, events, |s, ev| {
            event_day_impact_around(s, ev.date, baseline).map(|imp| imp.to_row(s.symbol(), ev))
        })
    }

    fn run_stage<R, F>(&self, stage: &str, series: &[TimeSeries], events: &[Event], f: F) -> StageOutput<R>
    where
        R: ResultRow + Send,
        F: Fn(&TimeSeries, &Event) -> Result<R, SkipReason> + Sync,
    {
        let events = self.prepare_events(events);

        let per_symbol: Vec<(Vec<R>, Vec<Skip>)> = series
            .par_iter()
            .map(|s| {
                let mut rows = Vec::new();
                let mut skipped = Vec::new();
                for ev in &events {
                    match f(s, ev) {
                        Ok(r) => rows.push(r),
                        Err(reason) => {
                            debug!(
                                stage,
                                symbol = s.symbol(),
                                event = %ev.name,
                                event_date = %ev.date,
                                reason = reason.as_str(),
                                "pair skipped"
                            );
                            skipped.push(Skip {
                                symbol: s.symbol().to_string(),
                                event: ev.name.clone(),
                                event_date: ev.date,
                                reason,
                            });
                        }
                    }
                }
                (rows, skipped)
            })
            .collect();

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for (r, s) in per_symbol {
            rows.extend(r);
            skipped.extend(s);
        }
        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        skipped.sort_by(|a, b| {
            (a.symbol.as_str(), a.event.as_str(), a.event_date)
                .cmp(&(b.symbol.as_str(), b.event.as_str(), b.event_date))
        });

        info!(
            stage,
            symbols = series.len(),
            events = events.len(),
            rows = rows.len(),
            skipped = skipped.len(),
            "stage complete"
        );
        StageOutput { rows, skipped }
    }

    pub fn vol_delta_verdicts(&self, rows: &[WindowStatRow]) -> Vec<GroupVerdict> {
        test_samples(&vol_delta_samples(rows), TestKind::VolDelta, &self.test_config())
    }

    pub fn impact_verdicts(&self, rows: &[ImpactRow]) -> Vec<GroupVerdict> {
        test_samples(&impact_ratio_samples(rows), TestKind::ImpactRatio, &self.test_config())
    }

    /// Full summary document for both result tables.
    pub fn summary(&self, window_rows: &[WindowStatRow], impact_rows: &[ImpactRow]) -> String {
        let vol = self.vol_delta_verdicts(window_rows);
        let imp = self.impact_verdicts(impact_rows);
        let significant = vol.iter().chain(&imp).filter(|v| v.verdict.is_significant()).count();
        info!(
            vol_groups = vol.len(),
            impact_groups = imp.len(),
            significant,
            "tests complete"
        );
        render_summary(&vol, &imp, &self.narrative_context())
    }

    pub fn window_stat_medians(&self, rows: &[WindowStatRow]) -> Vec<GroupMedian> {
        window_stat_medians(rows)
    }

    pub fn impact_medians(&self, rows: &[ImpactRow]) -> Vec<GroupMedian> {
        impact_medians(rows)
    }

    /// Post-minus-pre correlation around the latest `event_name` event.
    ///
    /// Uses all events of that name; the event tail does not apply.
    pub fn correlation_delta(
        &self,
        series: &[TimeSeries],
        events: &[Event],
        event_name: &str,
    ) -> Result<CorrDeltaMatrix, CorrDeltaError> {
        let m = correlation_delta(series, events, event_name, self.config.corr_window)?;
        info!(
            event = event_name,
            anchor = %m.anchor_date,
            symbols = m.symbols.len(),
            pre_n = m.pre_n,
            post_n = m.post_n,
            "correlation delta complete"
        );
        Ok(m)
    }
}
