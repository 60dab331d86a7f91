//! Persistence of the consolidated table, the summary table and the run report.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::metas::summary::{MetricRow, RAMO_COLUMN, TRIBUNAL_COLUMN, summary_columns};
use crate::metas::types::{Meta, MetricValue};
use crate::source::ConsolidatedTable;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Writes the consolidated table with its union header.
pub fn write_consolidated(path: &Path, table: &ConsolidatedTable) -> Result<()> {
    debug!(path = %path.display(), rows = table.len(), "Writing consolidated table");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = table.len(), "Consolidated table written");
    Ok(())
}

/// Writes one row per court under the fixed summary header.
pub fn write_summary(path: &Path, rows: &[MetricRow]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(summary_columns())?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    info!(path = %path.display(), courts = rows.len(), "Summary table written");
    Ok(())
}

/// Reads a summary table back. Cells that are not numbers become `NA`;
/// metric columns absent from the file stay `NA`.
pub fn read_summary(path: &Path) -> Result<Vec<MetricRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let tribunal_idx =
        position(TRIBUNAL_COLUMN).with_context(|| format!("{TRIBUNAL_COLUMN} column missing"))?;
    let ramo_idx = position(RAMO_COLUMN);
    let meta_idx: Vec<(Meta, usize)> = Meta::ALL
        .iter()
        .filter_map(|meta| position(meta.as_str()).map(|i| (*meta, i)))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let ramo = ramo_idx.and_then(|i| record.get(i)).unwrap_or_default();
        let mut row = MetricRow::new(record.get(tribunal_idx).unwrap_or_default(), ramo);
        for (meta, i) in &meta_idx {
            row.set(*meta, MetricValue::parse_cell(record.get(*i).unwrap_or_default()));
        }
        rows.push(row);
    }

    debug!(path = %path.display(), courts = rows.len(), "Summary table read");
    Ok(rows)
}

/// Writes any serializable value as pretty JSON.
pub fn write_report(path: &Path, report: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "Run report written");
    Ok(())
}
