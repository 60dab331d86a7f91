use crate::error::{MetasError, Result};
use crate::records::CaseFlowRecord;
use std::collections::BTreeMap;
use tracing::warn;

/// What to do when one court's records carry different branch labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchConflictPolicy {
    /// Keep the label of the first record and log the disagreement.
    #[default]
    FirstSeen,
    /// Abort the run with [`MetasError::BranchConflict`].
    Reject,
}

/// Summed case-flow counts of one court.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtTotals {
    pub court: String,
    pub branch: String,
    pub judged: f64,
    pub new_cases: f64,
    pub dessobrestados: f64,
    pub suspended: f64,
    /// Number of source rows folded into these totals.
    pub records: usize,
}

impl CourtTotals {
    fn from_first(record: &CaseFlowRecord) -> Self {
        CourtTotals {
            court: record.court.clone(),
            branch: record.branch.clone(),
            judged: record.judged,
            new_cases: record.new_cases,
            dessobrestados: record.dessobrestados,
            suspended: record.suspended,
            records: 1,
        }
    }

    fn add(&mut self, record: &CaseFlowRecord) {
        self.judged += record.judged;
        self.new_cases += record.new_cases;
        self.dessobrestados += record.dessobrestados;
        self.suspended += record.suspended;
        self.records += 1;
    }
}

/// Groups records by court and sums their counts.
///
/// Courts come out in ascending identifier order. The branch of each court is
/// taken from its first record.
pub fn aggregate_courts(
    records: &[CaseFlowRecord],
    policy: BranchConflictPolicy,
) -> Result<Vec<CourtTotals>> {
    if records.is_empty() {
        return Err(MetasError::EmptyInput);
    }

    let mut courts: BTreeMap<&str, CourtTotals> = BTreeMap::new();

    for record in records {
        match courts.get_mut(record.court.as_str()) {
            Some(totals) => {
                if totals.branch != record.branch {
                    match policy {
                        BranchConflictPolicy::FirstSeen => warn!(
                            court = %record.court,
                            kept = %totals.branch,
                            ignored = %record.branch,
                            "Conflicting branch labels for court, keeping first"
                        ),
                        BranchConflictPolicy::Reject => {
                            return Err(MetasError::BranchConflict {
                                court: record.court.clone(),
                                first: totals.branch.clone(),
                                other: record.branch.clone(),
                            });
                        }
                    }
                }
                totals.add(record);
            }
            None => {
                courts.insert(&record.court, CourtTotals::from_first(record));
            }
        }
    }

    Ok(courts.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(court: &str, branch: &str, counts: [f64; 4]) -> CaseFlowRecord {
        CaseFlowRecord::new(court, branch, counts)
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = aggregate_courts(&[], BranchConflictPolicy::FirstSeen);
        assert!(matches!(result, Err(MetasError::EmptyInput)));
    }

    #[test]
    fn test_sums_per_court() {
        let records = vec![
            record("TJSP", "Justiça Estadual", [10.0, 20.0, 1.0, 2.0]),
            record("TRF1", "Justiça Federal", [5.0, 5.0, 0.0, 0.0]),
            record("TJSP", "Justiça Estadual", [30.0, 40.0, 3.0, 4.0]),
        ];

        let courts = aggregate_courts(&records, BranchConflictPolicy::FirstSeen).unwrap();

        assert_eq!(courts.len(), 2);
        let tjsp = &courts[0];
        assert_eq!(tjsp.court, "TJSP");
        assert_eq!(tjsp.judged, 40.0);
        assert_eq!(tjsp.new_cases, 60.0);
        assert_eq!(tjsp.dessobrestados, 4.0);
        assert_eq!(tjsp.suspended, 6.0);
        assert_eq!(tjsp.records, 2);
        assert_eq!(courts[1].court, "TRF1");
        assert_eq!(courts[1].records, 1);
    }

    #[test]
    fn test_first_seen_branch_wins() {
        let records = vec![
            record("TJX", "Justiça Estadual", [1.0, 1.0, 0.0, 0.0]),
            record("TJX", "Justiça Federal", [1.0, 1.0, 0.0, 0.0]),
        ];

        let courts = aggregate_courts(&records, BranchConflictPolicy::FirstSeen).unwrap();

        assert_eq!(courts[0].branch, "Justiça Estadual");
        assert_eq!(courts[0].judged, 2.0);
    }

    #[test]
    fn test_reject_policy_fails_on_conflict() {
        let records = vec![
            record("TJX", "Justiça Estadual", [1.0, 1.0, 0.0, 0.0]),
            record("TJX", "Justiça Federal", [1.0, 1.0, 0.0, 0.0]),
        ];

        let err = aggregate_courts(&records, BranchConflictPolicy::Reject).unwrap_err();

        match err {
            MetasError::BranchConflict {
                court,
                first,
                other,
            } => {
                assert_eq!(court, "TJX");
                assert_eq!(first, "Justiça Estadual");
                assert_eq!(other, "Justiça Federal");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
