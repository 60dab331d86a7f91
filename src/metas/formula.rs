//! The two ratio formulas applied to a court's summed case-flow totals.

use crate::metas::aggregate::CourtTotals;
use crate::metas::types::MetricValue;
use std::fmt;

/// Scale applied to the generic ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Multiplier {
    /// `* 100`
    Percent,
    /// `* 1000 / divisor`
    PerMille(f64),
}

impl Multiplier {
    pub fn value(self) -> f64 {
        match self {
            Multiplier::Percent => 100.0,
            Multiplier::PerMille(divisor) => 1000.0 / divisor,
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplier::Percent => f.write_str("100"),
            Multiplier::PerMille(d) => write!(f, "1000/{d}"),
        }
    }
}

/// Which formula a metric uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formula {
    /// `judged / (new + dessobrestados - suspended) * 100`
    TypeOne,
    /// `judged / (new - suspended) * multiplier`
    Generic(Multiplier),
}

impl Formula {
    pub fn apply(self, totals: &CourtTotals) -> MetricValue {
        match self {
            Formula::TypeOne => type_one(totals),
            Formula::Generic(multiplier) => generic(totals, multiplier),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::TypeOne => f.write_str("T1"),
            Formula::Generic(m) => write!(f, "generic({m})"),
        }
    }
}

pub fn type_one(totals: &CourtTotals) -> MetricValue {
    let denominator = totals.new_cases + totals.dessobrestados - totals.suspended;
    ratio(totals.judged, denominator, 100.0)
}

pub fn generic(totals: &CourtTotals, multiplier: Multiplier) -> MetricValue {
    let denominator = totals.new_cases - totals.suspended;
    ratio(totals.judged, denominator, multiplier.value())
}

fn ratio(numerator: f64, denominator: f64, scale: f64) -> MetricValue {
    if denominator == 0.0 {
        return MetricValue::NotApplicable;
    }
    let value = numerator / denominator * scale;
    if value.is_finite() {
        MetricValue::Value(value)
    } else {
        MetricValue::NotApplicable
    }
}
