//! Single-stage commands: `window-stats`, `impact`, `tests`, `corr-delta`.
//!
//! `tests` reads the tables the first two write; it refuses to run when they
//! are missing.

use std::path::Path;

use anyhow::{Context, Result};
use evs_config::ConfigMode;
use tracing::warn;

use super::{load_engine, load_events, load_universe, print_medians, print_skip_counts};
use crate::{ConfigArgs, InputArgs};

pub fn window_stats(input: &InputArgs, out_dir: &Path, cfg: &ConfigArgs) -> Result<()> {
    let (_loaded, engine) = load_engine(ConfigMode::WindowStats, cfg)?;
    let series = load_universe(&input.data_dir)?;
    let events = load_events(&input.events)?;

    let out = engine.window_stat_rows(&series, &events);
    if out.rows.is_empty() {
        warn!("no window-stat rows produced (check symbols or widen the event subset)");
    }
    print_medians(
        "median pre/post deltas:",
        &engine.window_stat_medians(&out.rows),
    );
    print_skip_counts("window_stats", &out.skipped, &out.skip_counts());

    evs_artifacts::ensure_out_dir(out_dir)?;
    let path = evs_artifacts::write_window_stat_rows(out_dir, &out.rows)?;
    println!("window_stats_rows={}", out.rows.len());
    println!("saved={}", path.display());
    Ok(())
}

pub fn impact(input: &InputArgs, out_dir: &Path, cfg: &ConfigArgs) -> Result<()> {
    let (_loaded, engine) = load_engine(ConfigMode::Impact, cfg)?;
    let series = load_universe(&input.data_dir)?;
    let events = load_events(&input.events)?;

    let out = engine.impact_rows(&series, &events);
    if out.rows.is_empty() {
        warn!("no impact rows produced (check symbols or widen the event subset)");
    }
    print_medians(
        "median impact ratio (event-day |ret| / baseline):",
        &engine.impact_medians(&out.rows),
    );
    print_skip_counts("impact", &out.skipped, &out.skip_counts());

    evs_artifacts::ensure_out_dir(out_dir)?;
    let path = evs_artifacts::write_impact_rows(out_dir, &out.rows)?;
    println!("impact_rows={}", out.rows.len());
    println!("saved={}", path.display());
    Ok(())
}

pub fn tests(out_dir: &Path, cfg: &ConfigArgs) -> Result<()> {
    let (_loaded, engine) = load_engine(ConfigMode::Tests, cfg)?;

    let window_rows = evs_artifacts::read_window_stat_rows(out_dir)?;
    let impact_rows = evs_artifacts::read_impact_rows(out_dir)?;

    let doc = engine.summary(&window_rows, &impact_rows);
    println!("{doc}");

    let path = evs_artifacts::write_summary(out_dir, &doc)?;
    println!("saved={}", path.display());
    Ok(())
}

pub fn corr_delta(event: &str, input: &InputArgs, out_dir: &Path, cfg: &ConfigArgs) -> Result<()> {
    let (_loaded, engine) = load_engine(ConfigMode::CorrDelta, cfg)?;
    let series = load_universe(&input.data_dir)?;
    let events = load_events(&input.events)?;

    let m = engine
        .correlation_delta(&series, &events, event)
        .with_context(|| format!("CORR_DELTA_FAILED event={event}"))?;

    println!(
        "corr_delta event={} anchor_date={} pre_n={} post_n={}",
        m.event, m.anchor_date, m.pre_n, m.post_n
    );
    for (sym, row) in m.symbols.iter().zip(&m.values) {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:+.3}")).collect();
        println!("  {sym:<10} {}", cells.join(" "));
    }

    evs_artifacts::ensure_out_dir(out_dir)?;
    let path = evs_artifacts::write_corr_delta(out_dir, &m)?;
    println!("saved={}", path.display());
    Ok(())
}
