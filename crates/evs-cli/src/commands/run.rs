//! `evs run`: every stage over one load of the inputs, then `manifest.json`.

use std::path::Path;

use anyhow::{Context, Result};
use evs_artifacts::{file_name, RunManifest};
use evs_config::ConfigMode;
use tracing::info;

use super::{load_engine, load_events, load_universe, print_medians, print_skip_counts};
use crate::{ConfigArgs, InputArgs};

pub fn run_all(
    input: &InputArgs,
    out_dir: &Path,
    corr_events: &[String],
    cfg: &ConfigArgs,
) -> Result<()> {
    let (loaded, engine) = load_engine(ConfigMode::Run, cfg)?;
    let series = load_universe(&input.data_dir)?;
    let events = load_events(&input.events)?;
    evs_artifacts::ensure_out_dir(out_dir)?;

    let mut manifest = RunManifest::new(&loaded.config_hash, *engine.config());
    manifest.counts.symbols = series.len();
    manifest.counts.events = events.len();

    let win = engine.window_stat_rows(&series, &events);
    print_medians(
        "median pre/post deltas:",
        &engine.window_stat_medians(&win.rows),
    );
    print_skip_counts("window_stats", &win.skipped, &win.skip_counts());
    let path = evs_artifacts::write_window_stat_rows(out_dir, &win.rows)?;
    manifest.counts.window_rows = win.rows.len();
    manifest.counts.window_skipped = win.skipped.len();
    manifest.artifacts.window_stats_csv = Some(file_name(&path));

    let imp = engine.impact_rows(&series, &events);
    print_medians(
        "median impact ratio (event-day |ret| / baseline):",
        &engine.impact_medians(&imp.rows),
    );
    print_skip_counts("impact", &imp.skipped, &imp.skip_counts());
    let path = evs_artifacts::write_impact_rows(out_dir, &imp.rows)?;
    manifest.counts.impact_rows = imp.rows.len();
    manifest.counts.impact_skipped = imp.skipped.len();
    manifest.artifacts.impact_csv = Some(file_name(&path));

    let doc = engine.summary(&win.rows, &imp.rows);
    println!("{doc}");
    let path = evs_artifacts::write_summary(out_dir, &doc)?;
    manifest.artifacts.summary_txt = Some(file_name(&path));

    for event in corr_events {
        let m = engine
            .correlation_delta(&series, &events, event)
            .with_context(|| format!("CORR_DELTA_FAILED event={event}"))?;
        let path = evs_artifacts::write_corr_delta(out_dir, &m)?;
        manifest.artifacts.corr_delta_csv.push(file_name(&path));
    }

    let manifest_path = evs_artifacts::write_manifest(out_dir, &manifest)?;
    info!(run_id = %manifest.run_id, out_dir = %out_dir.display(), "run complete");

    println!("run_id={}", manifest.run_id);
    println!("config_hash={}", manifest.config_hash);
    println!("manifest={}", manifest_path.display());
    Ok(())
}
