//! End-to-end run: consolidate sources, compute the summary, render charts.

use crate::chart::render_charts;
use crate::config::PipelineConfig;
use crate::metas::{MetricRow, aggregate_courts, build_summary};
use crate::output::{write_consolidated, write_report, write_summary};
use crate::progress::Progress;
use crate::source::{ConsolidatedTable, SkippedFile, discover_sources, load_sources};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Wall time of each stage, in milliseconds.
#[derive(Debug, Default, Serialize)]
pub struct StageTimings {
    pub consolidation_ms: u128,
    pub summary_ms: u128,
    pub charts_ms: u128,
    pub total_ms: u128,
}

/// What a run produced, written as JSON next to the tables.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub source_dir: PathBuf,
    pub files_loaded: Vec<PathBuf>,
    pub files_skipped: Vec<SkippedFile>,
    pub records: usize,
    pub courts: usize,
    pub unrecognized_branches: Vec<String>,
    pub consolidated_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub timings: StageTimings,
}

/// Output of the consolidation stage.
pub struct Consolidation {
    pub table: ConsolidatedTable,
    pub files_loaded: Vec<PathBuf>,
    pub files_skipped: Vec<SkippedFile>,
}

/// Discovers and reads every source file into one table.
pub async fn consolidate_sources(
    config: &PipelineConfig,
    progress: Arc<dyn Progress>,
) -> Result<Consolidation> {
    let paths = discover_sources(&config.source_dir, &config.file_pattern)?;
    let outcome = load_sources(paths, config.mode, progress).await?;

    Ok(Consolidation {
        table: outcome.table,
        files_loaded: outcome.loaded,
        files_skipped: outcome.skipped,
    })
}

/// Aggregates the table per court and computes every court's metrics.
///
/// Runs on the blocking pool so the per-court workers never stall the async
/// runtime.
pub async fn summarize(
    table: ConsolidatedTable,
    config: &PipelineConfig,
    progress: Arc<dyn Progress>,
) -> Result<(Vec<MetricRow>, usize)> {
    let mode = config.mode;
    let policy = config.branch_policy;

    let (rows, records) = tokio::task::spawn_blocking(move || {
        let records = table.case_flow_records()?;
        let courts = aggregate_courts(&records, policy)?;
        let rows = build_summary(&courts, mode, progress.as_ref());
        Ok::<_, crate::error::MetasError>((rows, records.len()))
    })
    .await
    .context("summary worker panicked")??;

    Ok((rows, records))
}

/// Labels of `rows` that did not match any known branch, deduplicated.
pub fn unrecognized_branches(rows: &[MetricRow]) -> Vec<String> {
    let mut labels: Vec<String> = rows
        .iter()
        .filter(|row| crate::metas::Branch::from_label(&row.ramo_justica).is_none())
        .map(|row| row.ramo_justica.clone())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

/// Runs the full pipeline and writes every output under `config.output_dir`.
#[tracing::instrument(skip_all, fields(source_dir = %config.source_dir.display(), output_dir = %config.output_dir.display()))]
pub async fn run(config: &PipelineConfig, progress: Arc<dyn Progress>) -> Result<RunReport> {
    let started = Instant::now();
    let mut timings = StageTimings::default();

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;

    // Stage 1: consolidation
    let stage = Instant::now();
    let consolidation = consolidate_sources(config, progress.clone()).await?;
    let consolidated_path = config.consolidated_path();
    let consolidated_file = match write_consolidated(&consolidated_path, &consolidation.table) {
        Ok(()) => Some(consolidated_path),
        Err(e) => {
            error!(path = %consolidated_path.display(), error = %e, "Failed to write consolidated table");
            None
        }
    };
    timings.consolidation_ms = stage.elapsed().as_millis();
    info!(elapsed_ms = timings.consolidation_ms, "Consolidation finished");

    // Stage 2: per-court metrics
    let stage = Instant::now();
    let (rows, records) = summarize(consolidation.table, config, progress.clone()).await?;
    let summary_path = config.summary_path();
    let summary_file = match write_summary(&summary_path, &rows) {
        Ok(()) => Some(summary_path),
        Err(e) => {
            error!(path = %summary_path.display(), error = %e, "Failed to write summary table");
            None
        }
    };
    timings.summary_ms = stage.elapsed().as_millis();
    info!(elapsed_ms = timings.summary_ms, courts = rows.len(), "Summary finished");

    let unrecognized = unrecognized_branches(&rows);
    if !unrecognized.is_empty() {
        info!(labels = ?unrecognized, "Branches without a formula set computed Meta1 only");
    }

    // Stage 3: charts, strictly after the summary is complete
    let stage = Instant::now();
    let charts = if config.charts {
        render_charts(
            &config.output_dir,
            &rows,
            &config.chart_metrics,
            config.top_n,
            progress.as_ref(),
        )
        .with_context(|| format!("creating chart dir {}", config.output_dir.display()))?
    } else {
        Vec::new()
    };
    timings.charts_ms = stage.elapsed().as_millis();

    timings.total_ms = started.elapsed().as_millis();
    info!(elapsed_ms = timings.total_ms, "Pipeline finished");

    let report = RunReport {
        generated_at: Utc::now(),
        source_dir: config.source_dir.clone(),
        files_loaded: consolidation.files_loaded,
        files_skipped: consolidation.files_skipped,
        records,
        courts: rows.len(),
        unrecognized_branches: unrecognized,
        consolidated_file,
        summary_file,
        charts,
        timings,
    };

    if let Err(e) = write_report(&config.report_path(), &report) {
        error!(error = %e, "Failed to write run report");
    }

    Ok(report)
}
