//! Data types shared by the metric engine.

use std::fmt;
use std::str::FromStr;

/// Literal written to the summary table for unset or undefined cells.
pub const NOT_APPLICABLE: &str = "NA";

/// A named metric column of the summary table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Meta {
    Meta1,
    Meta2A,
    Meta2B,
    Meta2C,
    Meta2Ant,
    Meta4A,
    Meta4B,
    Meta6,
    Meta7A,
    Meta7B,
    Meta8A,
    Meta8B,
    Meta8,
    Meta10A,
    Meta10B,
    Meta10,
}

impl Meta {
    pub const COUNT: usize = 16;

    /// Every metric column, in the fixed order of the summary table.
    pub const ALL: [Meta; Meta::COUNT] = [
        Meta::Meta1,
        Meta::Meta2A,
        Meta::Meta2B,
        Meta::Meta2C,
        Meta::Meta2Ant,
        Meta::Meta4A,
        Meta::Meta4B,
        Meta::Meta6,
        Meta::Meta7A,
        Meta::Meta7B,
        Meta::Meta8A,
        Meta::Meta8B,
        Meta::Meta8,
        Meta::Meta10A,
        Meta::Meta10B,
        Meta::Meta10,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Meta::Meta1 => "Meta1",
            Meta::Meta2A => "Meta2A",
            Meta::Meta2B => "Meta2B",
            Meta::Meta2C => "Meta2C",
            Meta::Meta2Ant => "Meta2ANT",
            Meta::Meta4A => "Meta4A",
            Meta::Meta4B => "Meta4B",
            Meta::Meta6 => "Meta6",
            Meta::Meta7A => "Meta7A",
            Meta::Meta7B => "Meta7B",
            Meta::Meta8A => "Meta8A",
            Meta::Meta8B => "Meta8B",
            Meta::Meta8 => "Meta8",
            Meta::Meta10A => "Meta10A",
            Meta::Meta10B => "Meta10B",
            Meta::Meta10 => "Meta10",
        }
    }

    /// Column position within [`Meta::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Meta::ALL
            .iter()
            .copied()
            .find(|meta| meta.as_str() == s)
            .ok_or_else(|| format!("unknown metric `{s}`"))
    }
}

/// A computed cell: a number, or the "not applicable" marker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    Value(f64),
    #[default]
    NotApplicable,
}

impl MetricValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(v),
            MetricValue::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, MetricValue::Value(_))
    }

    /// Parses a summary cell. Anything that is not a finite number is `NA`.
    pub fn parse_cell(cell: &str) -> Self {
        match cell.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => MetricValue::Value(v),
            _ => MetricValue::NotApplicable,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write_number(f, *v),
            MetricValue::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Shortest round-trip form. Decimal exponents below -4 or from 16 up use
/// scientific notation (`1e+16`, `1.5e-05`); integral values otherwise keep
/// one decimal (`90.0`).
fn write_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let scientific = format!("{v:e}");
    if let Some((mantissa, exp)) = scientific.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            if v != 0.0 && !(-4..16).contains(&exp) {
                let sign = if exp < 0 { '-' } else { '+' };
                return write!(f, "{mantissa}e{sign}{:02}", exp.abs());
            }
        }
    }

    if v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

/// The eight justice branches with a dedicated formula set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Estadual,
    Trabalho,
    Federal,
    MilitarUniao,
    MilitarEstadual,
    SuperiorEleitoral,
    SuperiorTrabalho,
    SuperiorJustica,
}

impl Branch {
    pub const ALL: [Branch; 8] = [
        Branch::Estadual,
        Branch::Trabalho,
        Branch::Federal,
        Branch::MilitarUniao,
        Branch::MilitarEstadual,
        Branch::SuperiorEleitoral,
        Branch::SuperiorTrabalho,
        Branch::SuperiorJustica,
    ];

    /// Label as it appears in the `ramo_justica` column.
    pub fn label(self) -> &'static str {
        match self {
            Branch::Estadual => "Justiça Estadual",
            Branch::Trabalho => "Justiça do Trabalho",
            Branch::Federal => "Justiça Federal",
            Branch::MilitarUniao => "Justiça Militar da União",
            Branch::MilitarEstadual => "Justiça Militar Estadual",
            Branch::SuperiorEleitoral => "Tribunal Superior Eleitoral",
            Branch::SuperiorTrabalho => "Tribunal Superior do Trabalho",
            Branch::SuperiorJustica => "Superior Tribunal de Justiça",
        }
    }

    /// Exact-match lookup. Unknown labels return `None`.
    pub fn from_label(label: &str) -> Option<Branch> {
        Branch::ALL.iter().copied().find(|b| b.label() == label)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
