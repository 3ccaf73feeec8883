//! Command handler modules for evs-cli.
//!
//! Shared loading/printing helpers live here.
//! Command-specific logic lives in the submodules.

pub mod quality;
pub mod run;
pub mod study;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use evs_config::{ConfigMode, EngineConfig, LoadedConfig, UnusedKeyPolicy};
use evs_engine::{Skip, StudyEngine};
use evs_schemas::{Event, GroupMedian, TimeSeries};
use tracing::{info, warn};

use crate::ConfigArgs;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Load layered config for `mode`, report unused keys, build the engine.
///
/// No `--config` means defaults (hash of `{}`).
pub fn load_engine(mode: ConfigMode, args: &ConfigArgs) -> Result<(LoadedConfig, StudyEngine)> {
    let loaded = if args.config_paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        evs_config::load_layered_yaml(&args.config_paths)?
    };

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = evs_config::report_unused_keys(mode, &loaded.config_json, policy)?;
    for key in &report.unused_leaf_pointers {
        warn!(mode = %report.mode, key = %key, "config key not read by this stage");
    }

    let cfg = EngineConfig::from_config_json(&loaded.config_json)?;
    info!(
        mode = mode.as_str(),
        config_hash = %loaded.config_hash,
        pre_days = cfg.pre_days,
        post_days = cfg.post_days,
        baseline_window = cfg.baseline_window,
        min_n = cfg.min_n,
        alpha = cfg.alpha,
        "config loaded"
    );
    Ok((loaded, StudyEngine::new(cfg)))
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Every readable, non-empty price cache in `data_dir`, sorted by symbol.
///
/// Unreadable files are skipped with a warning; zero usable series is an error.
/// A missing directory is a [`evs_artifacts::MissingInputArtifact`].
pub fn load_universe(data_dir: &Path) -> Result<Vec<TimeSeries>> {
    evs_artifacts::require_input_dir(data_dir, evs_artifacts::PRICE_LOADER_STAGE)?;
    let symbols = evs_md::discover_symbols(data_dir)?;
    if symbols.is_empty() {
        anyhow::bail!(
            "NO_SERIES_LOADED: no *{} files in {}",
            evs_md::CACHE_SUFFIX,
            data_dir.display()
        );
    }

    let mut out = Vec::with_capacity(symbols.len());
    for sym in &symbols {
        let path = evs_md::cache_path(data_dir, sym);
        match evs_md::load_price_csv(&path, sym) {
            Ok(s) if s.is_empty() => {
                warn!(symbol = %sym, "empty price cache, skipping");
            }
            Ok(s) => out.push(s),
            Err(e) => {
                warn!(symbol = %sym, path = %path.display(), error = %e, "unreadable price cache, skipping");
            }
        }
    }

    if out.is_empty() {
        anyhow::bail!(
            "NO_SERIES_LOADED: none of {} cache file(s) in {} were usable",
            symbols.len(),
            data_dir.display()
        );
    }
    let loaded: Vec<&str> = out.iter().map(|s| s.symbol()).collect();
    info!(symbols = ?loaded, "symbols loaded");
    Ok(out)
}

pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    evs_artifacts::require_input(path, evs_artifacts::EVENT_LOADER_STAGE)?;
    let events = evs_md::load_events_csv(path)
        .with_context(|| format!("load events failed: {}", path.display()))?;
    info!(events = events.len(), path = %path.display(), "events loaded");
    Ok(events)
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

pub fn print_skip_counts(stage: &str, skipped: &[Skip], counts: &BTreeMap<&'static str, usize>) {
    if skipped.is_empty() {
        return;
    }
    let parts: Vec<String> = counts.iter().map(|(k, v)| format!("{k}={v}")).collect();
    println!("{stage}_skipped={} {}", skipped.len(), parts.join(" "));
}

pub fn print_medians(title: &str, medians: &[GroupMedian]) {
    if medians.is_empty() {
        return;
    }
    println!("{title}");
    for g in medians {
        let stats: Vec<String> = g
            .medians
            .iter()
            .map(|(name, v)| format!("{name}={v:.6}"))
            .collect();
        println!("  {} {} rows={} {}", g.symbol, g.event, g.rows, stats.join(" "));
    }
}
