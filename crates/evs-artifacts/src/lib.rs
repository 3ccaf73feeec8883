//! evs-artifacts
//!
//! Files exchanged between stages and left behind by a run:
//!
//! | File                           | Written by     | Read by  |
//! |--------------------------------|----------------|----------|
//! | `daily_event_min_results.csv`  | `window-stats` | `tests`  |
//! | `event_day_impact_results.csv` | `impact`       | `tests`  |
//! | `basic_tests_summary.txt`      | `tests`        |          |
//! | `corr_delta_<event>.csv`       | `corr-delta`   |          |
//! | `manifest.json`                | `run`          |          |
//!
//! Inputs produced outside `evs`: the price caches (`<SYMBOL>_daily.csv`
//! under the data dir) and the event table.
//!
//! A stage whose input is absent fails with [`MissingInputArtifact`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use evs_config::EngineConfig;
use evs_schemas::{CorrDeltaMatrix, ImpactRow, WindowStatRow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WINDOW_STATS_CSV: &str = "daily_event_min_results.csv";
pub const IMPACT_CSV: &str = "event_day_impact_results.csv";
pub const SUMMARY_TXT: &str = "basic_tests_summary.txt";
pub const MANIFEST_JSON: &str = "manifest.json";

pub const WINDOW_STAT_COLUMNS: [&str; 11] = [
    "symbol",
    "event",
    "event_date",
    "pre_vol",
    "post_vol",
    "vol_delta",
    "pre_mean",
    "post_mean",
    "ret_delta",
    "pre_n",
    "post_n",
];

pub const IMPACT_COLUMNS: [&str; 7] = [
    "symbol",
    "event",
    "event_date",
    "event_day_ret",
    "event_day_abs",
    "baseline_abs20",
    "impact_ratio",
];

/// Producer named when the price-cache directory is missing.
pub const PRICE_LOADER_STAGE: &str = "price loader";
/// Producer named when the event table is missing.
pub const EVENT_LOADER_STAGE: &str = "event loader";

/// `corr_delta_<event>.csv`
pub fn corr_delta_file_name(event: &str) -> String {
    format!("corr_delta_{event}.csv")
}

/// A stage input that an earlier stage should have produced is missing.
///
/// Wrapped in `anyhow::Error`; callers can `downcast_ref::<MissingInputArtifact>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInputArtifact {
    pub path: PathBuf,
    /// What produces this input (`evs window-stats`, `event loader`, ...).
    pub stage: &'static str,
}

impl fmt::Display for MissingInputArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MISSING_INPUT_ARTIFACT path={}: run {} first",
            self.path.display(),
            self.stage
        )
    }
}

impl std::error::Error for MissingInputArtifact {}

fn missing(path: &Path, stage: &'static str) -> anyhow::Error {
    MissingInputArtifact {
        path: path.to_path_buf(),
        stage,
    }
    .into()
}

/// `Ok` when `path` is a file; otherwise [`MissingInputArtifact`] naming `stage`.
pub fn require_input(path: &Path, stage: &'static str) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(missing(path, stage))
}

/// Directory form of [`require_input`].
pub fn require_input_dir(path: &Path, stage: &'static str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    Err(missing(path, stage))
}

pub fn ensure_out_dir(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir failed: {}", out_dir.display()))
}

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// Header is always written, even for zero rows.
fn write_table<R: Serialize>(path: &Path, columns: &[&str], rows: &[R]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create csv failed: {}", path.display()))?;
    w.write_record(columns)?;
    for r in rows {
        w.serialize(r)
            .with_context(|| format!("write row failed: {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))?;
    Ok(())
}

fn read_table<R: DeserializeOwned>(path: &Path, stage: &'static str) -> Result<Vec<R>> {
    require_input(path, stage)?;
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("open csv failed: {}", path.display()))?;
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize().enumerate() {
        let row: R = rec.with_context(|| format!("{} line {}: bad row", path.display(), i + 2))?;
        out.push(row);
    }
    Ok(out)
}

pub fn write_window_stat_rows(out_dir: &Path, rows: &[WindowStatRow]) -> Result<PathBuf> {
    let path = out_dir.join(WINDOW_STATS_CSV);
    write_table(&path, &WINDOW_STAT_COLUMNS, rows)?;
    Ok(path)
}

pub fn read_window_stat_rows(out_dir: &Path) -> Result<Vec<WindowStatRow>> {
    read_table(&out_dir.join(WINDOW_STATS_CSV), "evs window-stats")
}

pub fn write_impact_rows(out_dir: &Path, rows: &[ImpactRow]) -> Result<PathBuf> {
    let path = out_dir.join(IMPACT_CSV);
    write_table(&path, &IMPACT_COLUMNS, rows)?;
    Ok(path)
}

pub fn read_impact_rows(out_dir: &Path) -> Result<Vec<ImpactRow>> {
    read_table(&out_dir.join(IMPACT_CSV), "evs impact")
}

// ---------------------------------------------------------------------------
// Summary / correlation
// ---------------------------------------------------------------------------

pub fn write_summary(out_dir: &Path, text: &str) -> Result<PathBuf> {
    let path = out_dir.join(SUMMARY_TXT);
    fs::write(&path, text).with_context(|| format!("write summary failed: {}", path.display()))?;
    Ok(path)
}

/// Square matrix with a leading `symbol` column.
pub fn write_corr_delta(out_dir: &Path, m: &CorrDeltaMatrix) -> Result<PathBuf> {
    let path = out_dir.join(corr_delta_file_name(&m.event));
    let mut w = csv::Writer::from_path(&path)
        .with_context(|| format!("create csv failed: {}", path.display()))?;

    let mut header = vec!["symbol".to_string()];
    header.extend(m.symbols.iter().cloned());
    w.write_record(&header)?;

    for (sym, row) in m.symbols.iter().zip(&m.values) {
        let mut rec = vec![sym.clone()];
        rec.extend(row.iter().map(|v| v.to_string()));
        w.write_record(&rec)?;
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactList {
    pub window_stats_csv: Option<String>,
    pub impact_csv: Option<String>,
    pub summary_txt: Option<String>,
    pub corr_delta_csv: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub symbols: usize,
    pub events: usize,
    pub window_rows: usize,
    pub window_skipped: usize,
    pub impact_rows: usize,
    pub impact_skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub config_hash: String,
    pub engine_config: EngineConfig,
    pub created_at_utc: DateTime<Utc>,
    pub counts: RunCounts,
    /// File names relative to the output directory.
    pub artifacts: ArtifactList,
}

impl RunManifest {
    pub const SCHEMA_VERSION: i32 = 1;

    pub fn new(config_hash: &str, engine_config: EngineConfig) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION,
            run_id: Uuid::new_v4(),
            config_hash: config_hash.to_string(),
            engine_config,
            created_at_utc: Utc::now(),
            counts: RunCounts::default(),
            artifacts: ArtifactList::default(),
        }
    }
}

/// Write `manifest.json` (pretty, trailing newline). Overwrites.
pub fn write_manifest(out_dir: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    let path = out_dir.join(MANIFEST_JSON);
    let json = serde_json::to_string_pretty(manifest).context("serialize manifest failed")?;
    fs::write(&path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", path.display()))?;
    Ok(path)
}

pub fn read_manifest(out_dir: &Path) -> Result<RunManifest> {
    let path = out_dir.join(MANIFEST_JSON);
    require_input(&path, "evs run")?;
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read manifest failed: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse manifest failed: {}", path.display()))
}

/// File name component of `path`, for manifest entries.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
