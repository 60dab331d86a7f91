//! Source discovery, per-file CSV reading and consolidation.
//!
//! Files are read concurrently (bounded by a semaphore) and only concatenated
//! once every read has finished. A file that fails to parse is logged and
//! skipped; the run continues with the rest.

use crate::error::{MetasError, Result, SourceError};
use crate::metas::ExecutionMode;
use crate::progress::{Progress, Stage};
use crate::records::{
    BRANCH_COLUMN, COUNT_COLUMNS, COURT_COLUMN, CaseFlowRecord, ESSENTIAL_COLUMNS,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Matches a file name against a pattern with at most one `*` wildcard.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => name == pattern,
    }
}

/// Lists the files in `dir` whose name matches `pattern`, sorted by path.
pub fn discover_sources(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let no_files = || MetasError::NoSourceFiles {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_files()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if matches_pattern(name, pattern) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(no_files());
    }

    files.sort();
    info!(count = files.len(), dir = %dir.display(), pattern, "Source files found");
    Ok(files)
}

/// Raw contents of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// Reads one comma-separated, UTF-8 source file with a header row.
///
/// Rows shorter than the header are padded with empty cells. A row longer
/// than the header rejects the whole file.
pub fn read_source(path: &Path) -> std::result::Result<SourceTable, SourceError> {
    let wrap = |source: csv::Error| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(wrap)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(wrap)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut padded = 0usize;
    for result in reader.records() {
        let record = result.map_err(wrap)?;
        if record.len() > headers.len() {
            return Err(SourceError::TooManyFields {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                found: record.len(),
                expected: headers.len(),
            });
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < headers.len() {
            padded += 1;
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }

    if padded > 0 {
        warn!(file = %path.display(), rows = padded, "Short rows padded with empty cells");
    }

    let table = SourceTable {
        path: path.to_path_buf(),
        headers,
        rows,
    };

    if ESSENTIAL_COLUMNS.iter().any(|c| !table.has_column(c)) {
        warn!(
            file = %path.display(),
            "Source file is missing essential columns ({COURT_COLUMN}, {BRANCH_COLUMN})"
        );
    }
    debug!(file = %path.display(), rows = table.rows.len(), "Source file read");

    Ok(table)
}

/// Union of every source table. Columns keep first-seen order; cells a file
/// does not have are left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ConsolidatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| MetasError::MissingColumn(name.to_string()))
    }

    /// Extracts the case-flow records.
    ///
    /// Empty count cells and missing-value markers (`NA`, `null`, ...) count
    /// as zero. Identifiers are taken verbatim, surrounding whitespace
    /// included. Rows without a court identifier are skipped. A count cell
    /// that is not a number aborts with [`MetasError::InvalidCount`].
    pub fn case_flow_records(&self) -> Result<Vec<CaseFlowRecord>> {
        if self.is_empty() {
            return Err(MetasError::EmptyInput);
        }

        let court_idx = self.require_column(COURT_COLUMN)?;
        let branch_idx = self.require_column(BRANCH_COLUMN)?;
        let mut count_idx = [0usize; 4];
        for (slot, column) in count_idx.iter_mut().zip(COUNT_COLUMNS) {
            *slot = self.require_column(column)?;
        }

        let mut records = Vec::with_capacity(self.rows.len());
        let mut without_court = 0usize;

        for row in &self.rows {
            let court = row[court_idx].as_str();
            if is_missing(court) {
                without_court += 1;
                continue;
            }

            let mut counts = [0.0f64; 4];
            for (i, value) in counts.iter_mut().enumerate() {
                *value = parse_count(court, COUNT_COLUMNS[i], &row[count_idx[i]])?;
            }

            records.push(CaseFlowRecord::new(court, &row[branch_idx], counts));
        }

        if without_court > 0 {
            warn!(rows = without_court, "Rows without {COURT_COLUMN} skipped");
        }
        if records.is_empty() {
            return Err(MetasError::EmptyInput);
        }

        Ok(records)
    }
}

/// Cell contents read as a missing value rather than as text.
const MISSING_VALUE_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&cell)
}

fn parse_count(court: &str, column: &str, cell: &str) -> Result<f64> {
    let cell = cell.trim();
    // Missing values do not contribute to a sum
    if is_missing(cell) {
        return Ok(0.0);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(0.0),
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MetasError::InvalidCount {
            court: court.to_string(),
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

/// Concatenates tables in the given order.
pub fn consolidate(tables: &[SourceTable]) -> ConsolidatedTable {
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for table in tables {
        for header in &table.headers {
            if !positions.contains_key(header) {
                positions.insert(header.clone(), headers.len());
                headers.push(header.clone());
            }
        }
    }

    let total_rows = tables.iter().map(|t| t.rows.len()).sum();
    let mut rows = Vec::with_capacity(total_rows);

    for table in tables {
        let mapping: Vec<usize> = table.headers.iter().map(|h| positions[h]).collect();
        for source_row in &table.rows {
            let mut row = vec![String::new(); headers.len()];
            for (cell, &target) in source_row.iter().zip(&mapping) {
                row[target] = cell.clone();
            }
            rows.push(row);
        }
    }

    ConsolidatedTable { headers, rows }
}

/// A source file left out of the consolidation.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of reading every discovered source file.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub table: ConsolidatedTable,
    pub loaded: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// Reads every file, skipping the unreadable ones, then consolidates.
///
/// Fails with [`MetasError::EmptyInput`] when no file could be read.
#[tracing::instrument(skip(paths, progress), fields(files = paths.len()))]
pub async fn load_sources(
    paths: Vec<PathBuf>,
    mode: ExecutionMode,
    progress: Arc<dyn Progress>,
) -> Result<LoadOutcome> {
    progress.start(Stage::ReadFiles, paths.len() as u64);

    let results: Vec<(PathBuf, std::result::Result<SourceTable, String>)> = match mode {
        ExecutionMode::Sequential => paths
            .into_iter()
            .map(|path| {
                let result = read_source(&path).map_err(|e| e.to_string());
                progress.advance(Stage::ReadFiles);
                (path, result)
            })
            .collect(),
        ExecutionMode::Parallel { workers } => {
            let semaphore = Arc::new(Semaphore::new(workers.max(1)));
            let mut tasks = Vec::with_capacity(paths.len());

            for path in paths {
                let sem = semaphore.clone();
                let progress = progress.clone();
                let task_path = path.clone();

                let task = tokio::spawn(async move {
                    let _permit = sem.acquire_owned().await.map_err(|e| e.to_string())?;
                    let result = tokio::task::spawn_blocking(move || {
                        read_source(&task_path).map_err(|e| e.to_string())
                    })
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r);
                    progress.advance(Stage::ReadFiles);
                    result
                });
                tasks.push((path, task));
            }

            // Barrier: nothing is concatenated before every read is done
            let mut results = Vec::with_capacity(tasks.len());
            for (path, task) in tasks {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(e.to_string()),
                };
                results.push((path, result));
            }
            results
        }
    };

    progress.finish(Stage::ReadFiles);

    let mut tables = Vec::new();
    let mut outcome = LoadOutcome::default();

    for (path, result) in results {
        match result {
            Ok(table) => {
                outcome.loaded.push(path);
                tables.push(table);
            }
            Err(reason) => {
                warn!(file = %path.display(), error = %reason, "Skipping unreadable source file");
                outcome.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    if tables.is_empty() {
        return Err(MetasError::EmptyInput);
    }

    outcome.table = consolidate(&tables);
    info!(
        files = outcome.loaded.len(),
        skipped = outcome.skipped.len(),
        rows = outcome.table.len(),
        "Sources consolidated"
    );

    Ok(outcome)
}
