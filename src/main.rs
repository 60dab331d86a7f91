//! CLI entry point for the Metas calculator.
//!
//! Provides subcommands for the full pipeline and for each of its stages:
//! consolidating source CSVs, computing the per-court summary, and charting
//! an existing summary.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use metas_tribunais::chart::{DEFAULT_CHART_METRICS, DEFAULT_TOP_N, render_charts};
use metas_tribunais::config::{
    CONSOLIDATED_FILE_NAME, DEFAULT_FILE_PATTERN, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR,
    PipelineConfig, REPORT_FILE_NAME, SUMMARY_FILE_NAME, default_workers,
};
use metas_tribunais::metas::catalog::{branch_formulas, formulas_for};
use metas_tribunais::metas::{Branch, BranchConflictPolicy, ExecutionMode, Meta};
use metas_tribunais::output::{read_summary, write_consolidated, write_summary};
use metas_tribunais::pipeline::{consolidate_sources, run, summarize};
use metas_tribunais::progress::{IndicatifProgress, Progress, SilentProgress};
use metas_tribunais::source::{consolidate, read_source};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "metas")]
#[command(about = "Computes judicial performance targets (Metas) per court", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate sources, compute the summary and render charts
    Run {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        exec: ExecArgs,

        #[command(flatten)]
        charts: ChartArgs,

        /// Consolidated table file name, inside the output directory
        #[arg(long, default_value = CONSOLIDATED_FILE_NAME)]
        consolidated_file: String,

        /// Summary table file name, inside the output directory
        #[arg(long, default_value = SUMMARY_FILE_NAME)]
        summary_file: String,

        /// Run report file name, inside the output directory
        #[arg(long, default_value = REPORT_FILE_NAME)]
        report_file: String,

        /// Do not render charts
        #[arg(long, default_value_t = false)]
        no_charts: bool,

        /// Abort when a court's rows carry different branch labels
        #[arg(long, default_value_t = false)]
        reject_branch_conflicts: bool,
    },
    /// Only consolidate the source CSVs into one table
    Consolidate {
        #[command(flatten)]
        sources: SourceArgs,

        #[command(flatten)]
        exec: ExecArgs,

        /// Output CSV path
        #[arg(long, default_value = "Saida/Consolidado.csv")]
        output: PathBuf,
    },
    /// Compute the summary table from an existing consolidated CSV
    Summarize {
        /// Consolidated CSV to read
        #[arg(short, long, default_value = "Saida/Consolidado.csv")]
        input: PathBuf,

        /// Summary CSV to write
        #[arg(short, long, default_value = "Saida/ResumoMetas.csv")]
        output: PathBuf,

        #[command(flatten)]
        exec: ExecArgs,

        /// Abort when a court's rows carry different branch labels
        #[arg(long, default_value_t = false)]
        reject_branch_conflicts: bool,
    },
    /// Render bar charts from an existing summary CSV
    Chart {
        /// Summary CSV to read
        #[arg(short, long, default_value = "Saida/ResumoMetas.csv")]
        summary: PathBuf,

        /// Directory for the chart files
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        #[command(flatten)]
        charts: ChartArgs,

        /// Hide progress bars
        #[arg(short, long, default_value_t = false)]
        quiet: bool,
    },
    /// List the formula set of every branch
    Branches {
        /// Only show this branch label
        #[arg(short, long)]
        branch: Option<String>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Directory containing the source CSVs
    #[arg(short = 'd', long, default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// File name pattern, with at most one `*`
    #[arg(short, long, default_value = DEFAULT_FILE_PATTERN)]
    pattern: String,

    /// Directory for every output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[derive(Args)]
struct ExecArgs {
    /// Maximum number of concurrent workers (defaults to available cores)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Read files and compute courts one at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Hide progress bars
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

impl ExecArgs {
    fn mode(&self) -> ExecutionMode {
        if self.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel {
                workers: self.concurrency.unwrap_or_else(default_workers),
            }
        }
    }

    fn progress(&self) -> Arc<dyn Progress> {
        progress_for(self.quiet)
    }
}

#[derive(Args)]
struct ChartArgs {
    /// Metrics to chart, comma separated
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_CHART_METRICS.to_vec())]
    metrics: Vec<Meta>,

    /// Number of courts per chart
    #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

fn progress_for(quiet: bool) -> Arc<dyn Progress> {
    if quiet {
        Arc::new(SilentProgress)
    } else {
        Arc::new(IndicatifProgress::new())
    }
}

fn conflict_policy(reject: bool) -> BranchConflictPolicy {
    if reject {
        BranchConflictPolicy::Reject
    } else {
        BranchConflictPolicy::FirstSeen
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/metas.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("metas.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            sources,
            exec,
            charts,
            consolidated_file,
            summary_file,
            report_file,
            no_charts,
            reject_branch_conflicts,
        } => {
            let config = PipelineConfig {
                source_dir: sources.source_dir,
                file_pattern: sources.pattern,
                output_dir: sources.output_dir,
                consolidated_file,
                summary_file,
                report_file,
                mode: exec.mode(),
                charts: !no_charts,
                chart_metrics: charts.metrics,
                top_n: charts.top,
                branch_policy: conflict_policy(reject_branch_conflicts),
            };

            let report = run(&config, exec.progress()).await?;
            info!(
                files = report.files_loaded.len(),
                skipped = report.files_skipped.len(),
                records = report.records,
                courts = report.courts,
                charts = report.charts.len(),
                total_ms = report.timings.total_ms,
                "Run complete"
            );
        }
        Commands::Consolidate {
            sources,
            exec,
            output,
        } => {
            let config = PipelineConfig {
                source_dir: sources.source_dir,
                file_pattern: sources.pattern,
                output_dir: sources.output_dir,
                mode: exec.mode(),
                ..PipelineConfig::default()
            };

            let consolidation = consolidate_sources(&config, exec.progress()).await?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_consolidated(&output, &consolidation.table)?;
        }
        Commands::Summarize {
            input,
            output,
            exec,
            reject_branch_conflicts,
        } => {
            let config = PipelineConfig {
                mode: exec.mode(),
                branch_policy: conflict_policy(reject_branch_conflicts),
                ..PipelineConfig::default()
            };

            let table = consolidate(&[read_source(&input)?]);
            let (rows, records) = summarize(table, &config, exec.progress()).await?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_summary(&output, &rows)?;
            info!(records, courts = rows.len(), "Summary complete");
        }
        Commands::Chart {
            summary,
            output_dir,
            charts,
            quiet,
        } => {
            let rows = read_summary(&summary)?;
            let progress = progress_for(quiet);
            let written = render_charts(
                &output_dir,
                &rows,
                &charts.metrics,
                charts.top,
                progress.as_ref(),
            )?;
            info!(charts = written.len(), "Charts complete");
        }
        Commands::Branches { branch } => {
            let entries: Vec<(String, _)> = match branch {
                Some(label) => {
                    let formulas = formulas_for(&label);
                    vec![(label, formulas)]
                }
                None => Branch::ALL
                    .iter()
                    .map(|b| (b.label().to_string(), branch_formulas(*b)))
                    .collect(),
            };

            for (label, formulas) in entries {
                let recognized = Branch::from_label(&label).is_some();
                for spec in formulas {
                    info!(
                        branch = %label,
                        recognized,
                        metric = %spec.meta,
                        formula = %spec.formula,
                        "Formula"
                    );
                }
            }
        }
    }

    Ok(())
}
