//! Metric engine: per-court aggregation, formula dispatch and summary rows.
//!
//! Records are grouped by court and summed first, then each court's branch
//! selects the formulas that fill its row of the summary table.

pub mod aggregate;
pub mod catalog;
pub mod formula;
pub mod summary;
pub mod types;

pub use aggregate::{BranchConflictPolicy, CourtTotals, aggregate_courts};
pub use summary::{ExecutionMode, MetricRow, build_summary, compute_row, summary_columns};
pub use types::{Branch, Meta, MetricValue, NOT_APPLICABLE};
