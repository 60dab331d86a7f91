//! Progress reporting for the pipeline stages.
//!
//! The orchestration layer reports through the [`Progress`] trait so the core
//! never depends on a terminal. [`IndicatifProgress`] draws one bar per stage.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Template shared by every stage bar.
pub const STAGE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {msg:22} [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec})";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ReadFiles,
    Courts,
    Charts,
}

impl Stage {
    pub fn description(self) -> &'static str {
        match self {
            Stage::ReadFiles => "Lendo arquivos CSV",
            Stage::Courts => "Processando tribunais",
            Stage::Charts => "Gerando gráficos",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Observer notified as work units of a stage complete.
pub trait Progress: Send + Sync {
    fn start(&self, stage: Stage, total: u64);
    fn advance(&self, stage: Stage);
    fn finish(&self, stage: Stage);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn start(&self, _stage: Stage, _total: u64) {}
    fn advance(&self, _stage: Stage) {}
    fn finish(&self, _stage: Stage) {}
}

/// Terminal progress bars, one per stage.
pub struct IndicatifProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<Stage, ProgressBar>>,
    style: ProgressStyle,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template(STAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        IndicatifProgress {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            style,
        }
    }

    fn bar(&self, stage: Stage) -> Option<ProgressBar> {
        let bars = self.bars.lock().ok()?;
        bars.get(&stage).cloned()
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for IndicatifProgress {
    fn start(&self, stage: Stage, total: u64) {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(self.style.clone());
        pb.set_message(stage.description());

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(stage, pb);
        }
    }

    fn advance(&self, stage: Stage) {
        if let Some(pb) = self.bar(stage) {
            pb.inc(1);
        }
    }

    fn finish(&self, stage: Stage) {
        if let Some(pb) = self.bar(stage) {
            pb.finish();
        }
    }
}
