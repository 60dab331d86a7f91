//! Raw case-flow rows and the column names they are read from.

pub const COURT_COLUMN: &str = "sigla_tribunal";
pub const BRANCH_COLUMN: &str = "ramo_justica";
pub const JUDGED_COLUMN: &str = "julgados_2025";
pub const NEW_CASES_COLUMN: &str = "casos_novos_2025";
pub const DESSOBRESTADOS_COLUMN: &str = "dessobrestados_2025";
pub const SUSPENDED_COLUMN: &str = "suspensos_2025";

/// Columns without which a run cannot start.
pub const ESSENTIAL_COLUMNS: [&str; 2] = [COURT_COLUMN, BRANCH_COLUMN];

/// Count columns, in the order of [`CaseFlowRecord`]'s fields.
pub const COUNT_COLUMNS: [&str; 4] = [
    JUDGED_COLUMN,
    NEW_CASES_COLUMN,
    DESSOBRESTADOS_COLUMN,
    SUSPENDED_COLUMN,
];

/// One reporting row of a court.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFlowRecord {
    pub court: String,
    pub branch: String,
    pub judged: f64,
    pub new_cases: f64,
    pub dessobrestados: f64,
    pub suspended: f64,
}

impl CaseFlowRecord {
    pub fn new(court: &str, branch: &str, counts: [f64; 4]) -> Self {
        let [judged, new_cases, dessobrestados, suspended] = counts;
        CaseFlowRecord {
            court: court.to_string(),
            branch: branch.to_string(),
            judged,
            new_cases,
            dessobrestados,
            suspended,
        }
    }
}
