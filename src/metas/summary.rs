use crate::metas::aggregate::CourtTotals;
use crate::metas::catalog::formulas_for;
use crate::metas::types::{Meta, MetricValue};
use crate::progress::{Progress, Stage};
use rayon::prelude::*;
use tracing::debug;

pub const TRIBUNAL_COLUMN: &str = "tribunal";
pub const RAMO_COLUMN: &str = "ramo_justica";

/// Header of the summary table, in output order.
pub fn summary_columns() -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(Meta::COUNT + 2);
    columns.push(TRIBUNAL_COLUMN);
    columns.push(RAMO_COLUMN);
    columns.extend(Meta::ALL.iter().map(|meta| meta.as_str()));
    columns
}

/// How per-court work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    /// Bounded worker pool with this many threads.
    Parallel { workers: usize },
}

/// One summary row: a value for every column of [`Meta::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub tribunal: String,
    pub ramo_justica: String,
    values: [MetricValue; Meta::COUNT],
}

impl MetricRow {
    /// A row with every metric set to `NA`.
    pub fn new(tribunal: &str, ramo_justica: &str) -> Self {
        MetricRow {
            tribunal: tribunal.to_string(),
            ramo_justica: ramo_justica.to_string(),
            values: [MetricValue::NotApplicable; Meta::COUNT],
        }
    }

    pub fn get(&self, meta: Meta) -> MetricValue {
        self.values[meta.index()]
    }

    pub fn set(&mut self, meta: Meta, value: MetricValue) {
        self.values[meta.index()] = value;
    }

    pub fn values(&self) -> &[MetricValue; Meta::COUNT] {
        &self.values
    }

    /// Cells in [`summary_columns`] order.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(Meta::COUNT + 2);
        record.push(self.tribunal.clone());
        record.push(self.ramo_justica.clone());
        record.extend(self.values.iter().map(ToString::to_string));
        record
    }
}

/// Evaluates the formula set of the court's branch.
pub fn compute_row(totals: &CourtTotals) -> MetricRow {
    let mut row = MetricRow::new(&totals.court, &totals.branch);
    for spec in formulas_for(&totals.branch) {
        row.set(spec.meta, spec.formula.apply(totals));
    }
    debug!(court = %totals.court, branch = %totals.branch, "Court metrics computed");
    row
}

/// Computes one row per court, preserving the order of `courts`.
pub fn build_summary(
    courts: &[CourtTotals],
    mode: ExecutionMode,
    progress: &dyn Progress,
) -> Vec<MetricRow> {
    progress.start(Stage::Courts, courts.len() as u64);

    let rows = match mode {
        ExecutionMode::Sequential => courts
            .iter()
            .map(|totals| {
                let row = compute_row(totals);
                progress.advance(Stage::Courts);
                row
            })
            .collect(),
        ExecutionMode::Parallel { workers } => {
            let compute = || -> Vec<MetricRow> {
                courts
                    .par_iter()
                    .map(|totals| {
                        let row = compute_row(totals);
                        progress.advance(Stage::Courts);
                        row
                    })
                    .collect()
            };

            match rayon::ThreadPoolBuilder::new()
                .num_threads(workers.max(1))
                .thread_name(|i| format!("metas-court-{i}"))
                .build()
            {
                Ok(pool) => pool.install(compute),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not build worker pool, using global pool");
                    compute()
                }
            }
        }
    };

    progress.finish(Stage::Courts);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metas::aggregate::{BranchConflictPolicy, aggregate_courts};
    use crate::metas::types::Branch;
    use crate::progress::SilentProgress;
    use crate::progress::tests::CountingProgress;
    use crate::records::CaseFlowRecord;
    use std::sync::atomic::Ordering;

    fn totals(court: &str, branch: &str, counts: [f64; 4]) -> CourtTotals {
        let [judged, new_cases, dessobrestados, suspended] = counts;
        CourtTotals {
            court: court.to_string(),
            branch: branch.to_string(),
            judged,
            new_cases,
            dessobrestados,
            suspended,
            records: 1,
        }
    }

    #[test]
    fn test_summary_columns_order() {
        assert_eq!(
            summary_columns(),
            vec![
                "tribunal", "ramo_justica", "Meta1", "Meta2A", "Meta2B", "Meta2C", "Meta2ANT",
                "Meta4A", "Meta4B", "Meta6", "Meta7A", "Meta7B", "Meta8A", "Meta8B", "Meta8",
                "Meta10A", "Meta10B", "Meta10",
            ]
        );
    }

    #[test]
    fn test_estadual_scenario() {
        let row = compute_row(&totals("ABC", "Justiça Estadual", [900.0, 1000.0, 50.0, 50.0]));

        assert_eq!(row.get(Meta::Meta1), MetricValue::Value(90.0));
        let meta2a = row.get(Meta::Meta2A).as_f64().unwrap();
        assert!((meta2a - 118.421_052_631_578_94).abs() < 1e-9);
        // Not part of the state-court set
        assert_eq!(row.get(Meta::Meta8), MetricValue::NotApplicable);
        assert_eq!(row.get(Meta::Meta10), MetricValue::NotApplicable);
    }

    #[test]
    fn test_unknown_branch_only_meta1() {
        let row = compute_row(&totals("TREX", "Justiça Eleitoral", [10.0, 20.0, 0.0, 0.0]));

        assert_eq!(row.get(Meta::Meta1), MetricValue::Value(50.0));
        for meta in Meta::ALL.iter().skip(1) {
            assert_eq!(row.get(*meta), MetricValue::NotApplicable, "{meta}");
        }
    }

    #[test]
    fn test_applicable_columns_per_branch() {
        use Meta::*;
        let cases: [(&str, &[Meta]); 9] = [
            (
                "Justiça Estadual",
                &[
                    Meta1, Meta2A, Meta2B, Meta2C, Meta2Ant, Meta4A, Meta4B, Meta6, Meta7A,
                    Meta7B, Meta8A, Meta8B, Meta10A, Meta10B,
                ],
            ),
            ("Justiça do Trabalho", &[Meta1, Meta2A, Meta2Ant, Meta4A, Meta4B]),
            (
                "Justiça Federal",
                &[
                    Meta1, Meta2A, Meta2B, Meta2Ant, Meta4A, Meta4B, Meta6, Meta7A, Meta7B,
                    Meta8A, Meta8B, Meta10A,
                ],
            ),
            ("Justiça Militar da União", &[Meta1, Meta2A, Meta2B, Meta2Ant, Meta4A, Meta4B]),
            ("Justiça Militar Estadual", &[Meta1, Meta2A, Meta2B, Meta2Ant, Meta4A, Meta4B]),
            ("Tribunal Superior Eleitoral", &[Meta1, Meta2A, Meta2B, Meta2Ant, Meta4A, Meta4B]),
            ("Tribunal Superior do Trabalho", &[Meta1, Meta2A, Meta2B, Meta2Ant, Meta4A, Meta4B]),
            (
                "Superior Tribunal de Justiça",
                &[Meta1, Meta2Ant, Meta4A, Meta4B, Meta6, Meta7A, Meta7B, Meta8, Meta10],
            ),
            ("Justiça Eleitoral", &[Meta1]),
        ];

        for (label, expected) in cases {
            let row = compute_row(&totals("T", label, [50.0, 100.0, 0.0, 10.0]));
            let applicable: Vec<Meta> = Meta::ALL
                .iter()
                .copied()
                .filter(|m| row.get(*m).is_applicable())
                .collect();
            assert_eq!(applicable, expected, "{label}");
        }
    }

    #[test]
    fn test_generic_values_use_branch_multiplier() {
        // judged / (new - suspended) = 50 / 90
        let ratio = 50.0 / 90.0;
        let cases = [
            ("Justiça Federal", Meta::Meta7A, 1000.0 / 3.5),
            ("Justiça Federal", Meta::Meta10A, 100.0),
            ("Justiça Estadual", Meta::Meta4A, 1000.0 / 6.5),
            ("Tribunal Superior do Trabalho", Meta::Meta4B, 100.0),
            ("Tribunal Superior Eleitoral", Meta::Meta4B, 1000.0 / 5.0),
            ("Superior Tribunal de Justiça", Meta::Meta8, 1000.0 / 10.0),
        ];

        for (label, meta, multiplier) in cases {
            let row = compute_row(&totals("T", label, [50.0, 100.0, 0.0, 10.0]));
            let value = row.get(meta).as_f64().unwrap();
            assert!((value - ratio * multiplier).abs() < 1e-9, "{label} {meta}");
        }
    }

    #[test]
    fn test_zero_denominator_only_affects_cell() {
        // new - suspended == 0 but new + dessobrestados - suspended != 0
        let row = compute_row(&totals("T", "Justiça do Trabalho", [10.0, 30.0, 20.0, 30.0]));

        assert_eq!(row.get(Meta::Meta1), MetricValue::Value(50.0));
        assert_eq!(row.get(Meta::Meta2A), MetricValue::NotApplicable);
        assert_eq!(row.to_record().len(), 18);
    }

    #[test]
    fn test_record_is_complete() {
        let row = compute_row(&totals("STJ", "Superior Tribunal de Justiça", [1.0, 2.0, 0.0, 0.0]));
        let record = row.to_record();

        assert_eq!(record.len(), summary_columns().len());
        assert_eq!(record[0], "STJ");
        assert_eq!(record[1], "Superior Tribunal de Justiça");
        assert_eq!(record[2], "50.0");
        assert_eq!(record[3], "NA");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records: Vec<CaseFlowRecord> = (0..50)
            .map(|i| {
                let branch = Branch::ALL[i % Branch::ALL.len()].label();
                CaseFlowRecord::new(
                    &format!("T{:02}", i % 17),
                    branch,
                    [i as f64, 100.0 + i as f64, 3.0, (i % 5) as f64],
                )
            })
            .collect();
        let courts = aggregate_courts(&records, BranchConflictPolicy::FirstSeen).unwrap();

        let sequential = build_summary(&courts, ExecutionMode::Sequential, &SilentProgress);
        let parallel = build_summary(
            &courts,
            ExecutionMode::Parallel { workers: 4 },
            &SilentProgress,
        );

        assert_eq!(sequential.len(), 17);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_progress_advanced_once_per_court() {
        let courts = vec![
            totals("A", "Justiça Federal", [1.0, 2.0, 0.0, 0.0]),
            totals("B", "Justiça Federal", [1.0, 2.0, 0.0, 0.0]),
            totals("C", "Justiça Federal", [1.0, 2.0, 0.0, 0.0]),
        ];
        let progress = CountingProgress::default();

        build_summary(&courts, ExecutionMode::Parallel { workers: 2 }, &progress);

        assert_eq!(progress.advanced.load(Ordering::SeqCst), 3);
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    }
}
