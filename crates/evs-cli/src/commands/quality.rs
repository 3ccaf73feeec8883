use std::path::Path;

use anyhow::Result;

/// Execute `evs quality`: print the per-series data-quality report.
///
/// Issues are reported, not fatal; only a missing or unreadable directory errors.
pub fn quality(data_dir: &Path) -> Result<()> {
    evs_artifacts::require_input_dir(data_dir, evs_artifacts::PRICE_LOADER_STAGE)?;
    let report = evs_md::build_quality_report(data_dir)?;
    println!("{report}");
    println!("quality_clean={}", report.is_clean());
    Ok(())
}
