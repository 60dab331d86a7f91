use crate::chart::{DEFAULT_CHART_METRICS, DEFAULT_TOP_N};
use crate::metas::{BranchConflictPolicy, ExecutionMode, Meta};
use std::path::PathBuf;

pub const DEFAULT_SOURCE_DIR: &str = "./Dados";
pub const DEFAULT_OUTPUT_DIR: &str = "./Saida";
pub const DEFAULT_FILE_PATTERN: &str = "teste_*.csv";
pub const CONSOLIDATED_FILE_NAME: &str = "Consolidado.csv";
pub const SUMMARY_FILE_NAME: &str = "ResumoMetas.csv";
pub const REPORT_FILE_NAME: &str = "relatorio.json";

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub file_pattern: String,
    pub output_dir: PathBuf,
    pub consolidated_file: String,
    pub summary_file: String,
    pub report_file: String,
    pub mode: ExecutionMode,
    pub charts: bool,
    pub chart_metrics: Vec<Meta>,
    pub top_n: usize,
    pub branch_policy: BranchConflictPolicy,
}

impl PipelineConfig {
    pub fn consolidated_path(&self) -> PathBuf {
        self.output_dir.join(&self.consolidated_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            consolidated_file: CONSOLIDATED_FILE_NAME.to_string(),
            summary_file: SUMMARY_FILE_NAME.to_string(),
            report_file: REPORT_FILE_NAME.to_string(),
            mode: ExecutionMode::Parallel {
                workers: default_workers(),
            },
            charts: true,
            chart_metrics: DEFAULT_CHART_METRICS.to_vec(),
            top_n: DEFAULT_TOP_N,
            branch_policy: BranchConflictPolicy::FirstSeen,
        }
    }
}

/// Worker count when none is given: the machine's available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
