//! evs-testkit
//!
//! Deterministic fixtures for scenario tests: weekday calendars, synthetic
//! return series, monthly event schedules, and CSV writers matching the
//! cache/event formats read by `evs-md`.
//!
//! No randomness source: noise comes from a fixed-seed LCG so every run of
//! every test sees identical inputs.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use evs_schemas::{Event, Observation, TimeSeries};

/// Fixture date. Panics on an impossible date so a typo fails the test at
/// its source.
pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("invalid fixture date {y}-{m:02}-{d:02}"))
}

/// `n` consecutive Monday to Friday dates starting at (or after) `start`.
pub fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = start;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d = d + Days::new(1);
    }
    out
}

/// Series on business days starting at `start` with the given returns.
pub fn series_from_returns(symbol: &str, start: NaiveDate, rets: &[f64]) -> Result<TimeSeries> {
    let dates = business_days(start, rets.len());
    let obs = dates
        .into_iter()
        .zip(rets.iter())
        .map(|(d, r)| Observation::new(d, *r))
        .collect();
    TimeSeries::new(symbol, obs).context("fixture series invalid")
}

/// `n` business days of the same return.
pub fn constant_series(symbol: &str, start: NaiveDate, n: usize, ret: f64) -> Result<TimeSeries> {
    series_from_returns(symbol, start, &vec![ret; n])
}

/// Fixed-seed noise in `[-scale, scale]`.
pub fn seeded_returns(seed: u64, n: usize, scale: f64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            (unit * 2.0 - 1.0) * scale
        })
        .collect()
}

/// One event per month on `day` (clamped to 28), starting at `first_year/first_month`.
pub fn monthly_events(name: &str, first_year: i32, first_month: u32, day: u32, count: usize) -> Vec<Event> {
    let day = day.clamp(1, 28);
    let mut out = Vec::with_capacity(count);
    let (mut y, mut m) = (first_year, first_month);
    for _ in 0..count {
        out.push(Event::new(name, ymd(y, m, day)));
        m += 1;
        if m > 12 {
            m = 1;
            y += 1;
        }
    }
    out
}

/// Write `date,ret` rows.
pub fn write_returns_csv(path: &Path, series: &TimeSeries) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create fixture csv: {}", path.display()))?;
    w.write_record(["date", "ret"])?;
    for o in series.observations() {
        w.write_record([o.date.to_string(), o.ret.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// Write `Date,Close` rows (capitalized header, as some providers emit).
pub fn write_closes_csv(path: &Path, closes: &[(NaiveDate, f64)]) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create fixture csv: {}", path.display()))?;
    w.write_record(["Date", "Close"])?;
    for (d, c) in closes {
        w.write_record([d.to_string(), c.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// Write `event,event_date,value` rows.
pub fn write_events_csv(path: &Path, events: &[Event]) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create fixture csv: {}", path.display()))?;
    w.write_record(["event", "event_date", "value"])?;
    for e in events {
        let v = e.value.map(|v| v.to_string()).unwrap_or_default();
        w.write_record([e.name.clone(), e.date.to_string(), v])?;
    }
    w.flush()?;
    Ok(())
}
