//! Bar charts of the best-ranked courts per metric, rendered as SVG.
//!
//! Rendering runs on a single thread once the summary is complete.

use crate::metas::summary::MetricRow;
use crate::metas::types::Meta;
use crate::progress::{Progress, Stage};
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Metrics charted when none are requested.
pub const DEFAULT_CHART_METRICS: [Meta; 5] = [
    Meta::Meta1,
    Meta::Meta2A,
    Meta::Meta2Ant,
    Meta::Meta4A,
    Meta::Meta6,
];

pub const DEFAULT_TOP_N: usize = 15;

const SVG_WIDTH: f64 = 1400.0;
const SVG_HEIGHT: f64 = 800.0;
const PLOT_LEFT: f64 = 100.0;
const PLOT_RIGHT: f64 = 40.0;
const PLOT_TOP: f64 = 80.0;
const PLOT_BOTTOM: f64 = 160.0;
const GRID_LINES: usize = 5;
const BAR_COLOR: &str = "#007ACC";
const FONT: &str = "DejaVu Sans, Arial, sans-serif";

/// Courts with a numeric value for `meta`, highest first. Ties are broken by
/// court identifier.
pub fn top_courts(rows: &[MetricRow], meta: Meta, n: usize) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = rows
        .iter()
        .filter_map(|row| row.get(meta).as_f64().map(|v| (row.tribunal.clone(), v)))
        .collect();

    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries.truncate(n);
    entries
}

/// File name of the chart for `meta`.
pub fn chart_file_name(meta: Meta) -> String {
    format!("grafico_{meta}.svg")
}

/// Renders a standalone SVG bar chart.
pub fn render_bar_chart(meta: Meta, entries: &[(String, f64)], top_n: usize) -> String {
    let plot_width = SVG_WIDTH - PLOT_LEFT - PLOT_RIGHT;
    let plot_height = SVG_HEIGHT - PLOT_TOP - PLOT_BOTTOM;
    let baseline = PLOT_TOP + plot_height;

    let max = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let min = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let span = if max - min > 0.0 { max - min } else { 1.0 };
    let y_of = |v: f64| PLOT_TOP + (max - v) / span * plot_height;
    let zero_y = y_of(0.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_WIDTH}\" height=\"{SVG_HEIGHT}\" viewBox=\"0 0 {SVG_WIDTH} {SVG_HEIGHT}\">"
    );
    let _ = writeln!(
        svg,
        "  <rect width=\"{SVG_WIDTH}\" height=\"{SVG_HEIGHT}\" fill=\"#ffffff\"/>"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"40\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"22\">{}</text>",
        SVG_WIDTH / 2.0,
        xml_escape(&format!(
            "Comparativo de Performance - {meta} (Top {top_n} Tribunais)"
        ))
    );

    for i in 0..=GRID_LINES {
        let value = min + span * i as f64 / GRID_LINES as f64;
        let y = y_of(value);
        let _ = writeln!(
            svg,
            "  <line x1=\"{PLOT_LEFT}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"#cccccc\" stroke-dasharray=\"6 4\"/>",
            PLOT_LEFT + plot_width
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-family=\"{FONT}\" font-size=\"12\">{value:.2}</text>",
            PLOT_LEFT - 8.0,
            y + 4.0
        );
    }

    let slot = if entries.is_empty() {
        plot_width
    } else {
        plot_width / entries.len() as f64
    };
    let bar_width = slot * 0.7;

    for (idx, (court, value)) in entries.iter().enumerate() {
        let x = PLOT_LEFT + slot * idx as f64 + (slot - bar_width) / 2.0;
        let top = y_of(*value).min(zero_y);
        let height = (y_of(*value) - zero_y).abs();
        let center = x + bar_width / 2.0;
        let court = xml_escape(court);

        let _ = writeln!(
            svg,
            "  <rect x=\"{x:.2}\" y=\"{top:.2}\" width=\"{bar_width:.2}\" height=\"{height:.2}\" fill=\"{BAR_COLOR}\"/>"
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{center:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"11\">{value:.2}</text>",
            top - 4.0
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{center:.2}\" y=\"{:.2}\" text-anchor=\"end\" transform=\"rotate(-45 {center:.2} {:.2})\" font-family=\"{FONT}\" font-size=\"12\">{court}</text>",
            baseline + 18.0,
            baseline + 18.0
        );
    }

    let _ = writeln!(
        svg,
        "  <line x1=\"{PLOT_LEFT}\" y1=\"{PLOT_TOP}\" x2=\"{PLOT_LEFT}\" y2=\"{baseline:.2}\" stroke=\"#333333\"/>"
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{PLOT_LEFT}\" y1=\"{zero_y:.2}\" x2=\"{:.2}\" y2=\"{zero_y:.2}\" stroke=\"#333333\"/>",
        PLOT_LEFT + plot_width
    );
    let _ = writeln!(
        svg,
        "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{FONT}\" font-size=\"14\">Tribunal</text>",
        PLOT_LEFT + plot_width / 2.0,
        SVG_HEIGHT - 20.0
    );
    let _ = writeln!(
        svg,
        "  <text x=\"30\" y=\"{:.2}\" text-anchor=\"middle\" transform=\"rotate(-90 30 {:.2})\" font-family=\"{FONT}\" font-size=\"14\">Valor da {meta}</text>",
        PLOT_TOP + plot_height / 2.0,
        PLOT_TOP + plot_height / 2.0
    );
    svg.push_str("</svg>\n");
    svg
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes one chart per metric into `dir` and returns the files written.
///
/// Metrics without any numeric value are skipped; a failed write is logged and
/// does not stop the remaining charts.
#[tracing::instrument(skip(dir, rows, metrics, progress), fields(dir = %dir.display(), courts = rows.len()))]
pub fn render_charts(
    dir: &Path,
    rows: &[MetricRow],
    metrics: &[Meta],
    top_n: usize,
    progress: &dyn Progress,
) -> std::io::Result<Vec<PathBuf>> {
    if rows.is_empty() {
        info!("Summary is empty, skipping charts");
        return Ok(Vec::new());
    }

    fs::create_dir_all(dir)?;
    progress.start(Stage::Charts, metrics.len() as u64);

    let mut written = Vec::new();
    for &meta in metrics {
        let entries = top_courts(rows, meta, top_n);
        if entries.is_empty() {
            warn!(metric = %meta, "No numeric values for metric, chart skipped");
            progress.advance(Stage::Charts);
            continue;
        }

        let path = dir.join(chart_file_name(meta));
        match fs::write(&path, render_bar_chart(meta, &entries, top_n)) {
            Ok(()) => {
                debug!(metric = %meta, path = %path.display(), bars = entries.len(), "Chart written");
                written.push(path);
            }
            Err(e) => error!(metric = %meta, path = %path.display(), error = %e, "Failed to write chart"),
        }
        progress.advance(Stage::Charts);
    }

    progress.finish(Stage::Charts);
    info!(charts = written.len(), "Charts rendered");
    Ok(written)
}
