//! CSV writers for raw and processed tables.

use crate::{
    error::AnalysisResult,
    loader::{DataPaths, RawData},
    pipeline::ProcessedOutputs,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write `rows` with a header row, creating parent directories as needed.
pub fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> AnalysisResult<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    log::debug!("export: wrote {count} rows to {}", path.display());
    Ok(count)
}

pub fn write_raw(paths: &DataPaths, raw: &RawData) -> AnalysisResult<()> {
    write_csv(&paths.funnel(), &raw.funnel)?;
    write_csv(&paths.rfm(), &raw.rfm)?;
    write_csv(&paths.behavior(), &raw.behavior)?;
    write_csv(&paths.sales(), &raw.sales)?;
    log::info!("export: raw tables written to {}", paths.raw_dir.display());
    Ok(())
}

/// Write every processed table; returns the files written, in order.
pub fn write_processed(paths: &DataPaths, out: &ProcessedOutputs) -> AnalysisResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    put(paths, &mut written, "funnel_stages.csv", &out.funnel.rows)?;
    put(paths, &mut written, "category_funnel_summary.csv", &out.funnel.by_category)?;

    put(paths, &mut written, "rfm_scored.csv", out.rfm.scored.iter().map(|c| c.row()))?;
    put(paths, &mut written, "rfm_segment_summary.csv", &out.rfm.segments)?;
    put(paths, &mut written, "rfm_score_summary.csv", &out.rfm.scores)?;

    put(paths, &mut written, "daily_funnel_summary.csv", &out.trend.daily_funnel)?;
    put(paths, &mut written, "daily_trend.csv", &out.trend.daily)?;
    put(paths, &mut written, "weekly_trend.csv", &out.trend.weekly)?;
    put(paths, &mut written, "monthly_trend.csv", &out.trend.monthly)?;
    put(paths, &mut written, "category_trend.csv", &out.trend.by_category)?;

    put(paths, &mut written, "session_summary.csv", &out.behavior.sessions)?;
    put(paths, &mut written, "session_category_summary.csv", &out.behavior.session_lengths)?;
    put(paths, &mut written, "daily_behavior_summary.csv", &out.behavior.daily)?;

    put(paths, &mut written, "category_sales_summary.csv", &out.sales.by_category)?;

    put(paths, &mut written, "kpi_dashboard.csv", &out.kpis)?;

    log::info!(
        "export: {} processed tables written to {}",
        written.len(),
        paths.processed_dir.display()
    );
    Ok(written)
}

fn put<T: Serialize>(
    paths: &DataPaths,
    written: &mut Vec<PathBuf>,
    file_name: &str,
    rows: impl IntoIterator<Item = T>,
) -> AnalysisResult<()> {
    let path = paths.processed(file_name);
    write_csv(&path, rows)?;
    written.push(path);
    Ok(())
}
