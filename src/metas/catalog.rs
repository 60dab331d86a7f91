//! Branch → metric dispatch catalog.
//!
//! Every branch computes `Meta1` with the type-1 formula. The remaining
//! entries and their multipliers are legally defined targets and are listed
//! literally below.

use crate::metas::formula::Formula::{self, Generic, TypeOne};
use crate::metas::formula::Multiplier::{PerMille, Percent};
use crate::metas::types::{Branch, Meta};

/// One metric a branch computes, and how.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub meta: Meta,
    pub formula: Formula,
}

const fn spec(meta: Meta, formula: Formula) -> MetricSpec {
    MetricSpec { meta, formula }
}

static ESTADUAL: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(8.0))),
    spec(Meta::Meta2B, Generic(PerMille(9.0))),
    spec(Meta::Meta2C, Generic(PerMille(9.5))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(6.5))),
    spec(Meta::Meta4B, Generic(Percent)),
    spec(Meta::Meta6, Generic(Percent)),
    spec(Meta::Meta7A, Generic(PerMille(5.0))),
    spec(Meta::Meta7B, Generic(PerMille(5.0))),
    spec(Meta::Meta8A, Generic(PerMille(7.5))),
    spec(Meta::Meta8B, Generic(PerMille(9.0))),
    spec(Meta::Meta10A, Generic(PerMille(9.0))),
    spec(Meta::Meta10B, Generic(PerMille(10.0))),
];

static TRABALHO: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(9.4))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(7.0))),
    spec(Meta::Meta4B, Generic(Percent)),
];

static FEDERAL: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(8.5))),
    spec(Meta::Meta2B, Generic(Percent)),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(7.0))),
    spec(Meta::Meta4B, Generic(Percent)),
    spec(Meta::Meta6, Generic(PerMille(3.5))),
    spec(Meta::Meta7A, Generic(PerMille(3.5))),
    spec(Meta::Meta7B, Generic(PerMille(3.5))),
    spec(Meta::Meta8A, Generic(PerMille(7.5))),
    spec(Meta::Meta8B, Generic(PerMille(9.0))),
    spec(Meta::Meta10A, Generic(Percent)),
];

static MILITAR_UNIAO: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(9.5))),
    spec(Meta::Meta2B, Generic(PerMille(9.9))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(9.5))),
    spec(Meta::Meta4B, Generic(PerMille(9.9))),
];

static MILITAR_ESTADUAL: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(9.0))),
    spec(Meta::Meta2B, Generic(PerMille(9.5))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(9.5))),
    spec(Meta::Meta4B, Generic(PerMille(9.9))),
];

static SUPERIOR_ELEITORAL: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(7.0))),
    spec(Meta::Meta2B, Generic(PerMille(9.9))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(9.0))),
    spec(Meta::Meta4B, Generic(PerMille(5.0))),
];

static SUPERIOR_TRABALHO: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2A, Generic(PerMille(9.5))),
    spec(Meta::Meta2B, Generic(PerMille(9.9))),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(7.0))),
    spec(Meta::Meta4B, Generic(Percent)),
];

static SUPERIOR_JUSTICA: &[MetricSpec] = &[
    spec(Meta::Meta1, TypeOne),
    spec(Meta::Meta2Ant, Generic(Percent)),
    spec(Meta::Meta4A, Generic(PerMille(9.0))),
    spec(Meta::Meta4B, Generic(Percent)),
    spec(Meta::Meta6, Generic(PerMille(7.5))),
    spec(Meta::Meta7A, Generic(PerMille(7.5))),
    spec(Meta::Meta7B, Generic(PerMille(7.5))),
    spec(Meta::Meta8, Generic(PerMille(10.0))),
    spec(Meta::Meta10, Generic(PerMille(10.0))),
];

static FALLBACK: &[MetricSpec] = &[spec(Meta::Meta1, TypeOne)];

/// Formula set of a recognized branch.
pub fn branch_formulas(branch: Branch) -> &'static [MetricSpec] {
    match branch {
        Branch::Estadual => ESTADUAL,
        Branch::Trabalho => TRABALHO,
        Branch::Federal => FEDERAL,
        Branch::MilitarUniao => MILITAR_UNIAO,
        Branch::MilitarEstadual => MILITAR_ESTADUAL,
        Branch::SuperiorEleitoral => SUPERIOR_ELEITORAL,
        Branch::SuperiorTrabalho => SUPERIOR_TRABALHO,
        Branch::SuperiorJustica => SUPERIOR_JUSTICA,
    }
}

/// Resolves a raw `ramo_justica` label. Unknown labels get `Meta1` only.
pub fn formulas_for(label: &str) -> &'static [MetricSpec] {
    match Branch::from_label(label) {
        Some(branch) => branch_formulas(branch),
        None => FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metas::formula::Multiplier;

    fn listing(branch: Branch) -> Vec<(Meta, Formula)> {
        branch_formulas(branch)
            .iter()
            .map(|s| (s.meta, s.formula))
            .collect()
    }

    /// Published formula table, one line per branch label.
    const PUBLISHED: [(&str, &str); 8] = [
        (
            "Justiça Estadual",
            "1(T1) 2A(1000/8) 2B(1000/9) 2C(1000/9.5) 2ANT(100) 4A(1000/6.5) 4B(100) 6(100) \
             7A(1000/5) 7B(1000/5) 8A(1000/7.5) 8B(1000/9) 10A(1000/9) 10B(1000/10)",
        ),
        (
            "Justiça do Trabalho",
            "1(T1) 2A(1000/9.4) 2ANT(100) 4A(1000/7) 4B(100)",
        ),
        (
            "Justiça Federal",
            "1(T1) 2A(1000/8.5) 2B(100) 2ANT(100) 4A(1000/7) 4B(100) 6(1000/3.5) \
             7A(1000/3.5) 7B(1000/3.5) 8A(1000/7.5) 8B(1000/9) 10A(100)",
        ),
        (
            "Justiça Militar da União",
            "1(T1) 2A(1000/9.5) 2B(1000/9.9) 2ANT(100) 4A(1000/9.5) 4B(1000/9.9)",
        ),
        (
            "Justiça Militar Estadual",
            "1(T1) 2A(1000/9) 2B(1000/9.5) 2ANT(100) 4A(1000/9.5) 4B(1000/9.9)",
        ),
        (
            "Tribunal Superior Eleitoral",
            "1(T1) 2A(1000/7) 2B(1000/9.9) 2ANT(100) 4A(1000/9) 4B(1000/5)",
        ),
        (
            "Tribunal Superior do Trabalho",
            "1(T1) 2A(1000/9.5) 2B(1000/9.9) 2ANT(100) 4A(1000/7) 4B(100)",
        ),
        (
            "Superior Tribunal de Justiça",
            "1(T1) 2ANT(100) 4A(1000/9) 4B(100) 6(1000/7.5) 7A(1000/7.5) 7B(1000/7.5) \
             8(1000/10) 10(1000/10)",
        ),
    ];

    /// Parses `2A(1000/8)` into `(Meta2A, Generic(PerMille(8.0)))`.
    fn published_entry(entry: &str) -> (Meta, Formula) {
        let (name, rest) = entry.split_once('(').unwrap();
        let multiplier = rest.strip_suffix(')').unwrap();
        let meta: Meta = format!("Meta{name}").parse().unwrap();
        let formula = match multiplier {
            "T1" => TypeOne,
            "100" => Generic(Percent),
            other => {
                let divisor = other.strip_prefix("1000/").unwrap();
                Generic(PerMille(divisor.parse().unwrap()))
            }
        };
        (meta, formula)
    }

    #[test]
    fn test_catalog_matches_published_table() {
        assert_eq!(PUBLISHED.len(), Branch::ALL.len());

        for (label, line) in PUBLISHED {
            let expected: Vec<(Meta, Formula)> =
                line.split_whitespace().map(published_entry).collect();
            let actual: Vec<(Meta, Formula)> = formulas_for(label)
                .iter()
                .map(|s| (s.meta, s.formula))
                .collect();
            assert_eq!(actual, expected, "{label}");

            let branch = Branch::from_label(label).unwrap();
            assert_eq!(listing(branch), expected, "{label}");
        }
    }

    #[test]
    fn test_every_branch_starts_with_type_one_meta1() {
        for branch in Branch::ALL {
            let first = branch_formulas(branch)[0];
            assert_eq!(first, spec(Meta::Meta1, TypeOne), "{branch}");
        }
    }

    #[test]
    fn test_no_duplicate_metas_and_catalog_order() {
        for branch in Branch::ALL {
            let metas: Vec<Meta> = branch_formulas(branch).iter().map(|s| s.meta).collect();
            let mut sorted = metas.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(metas, sorted, "{branch}");
        }
    }

    #[test]
    fn test_unknown_branch_falls_back_to_meta1() {
        assert_eq!(formulas_for("Justiça Eleitoral"), FALLBACK);
        assert_eq!(formulas_for(""), FALLBACK);
        assert_eq!(FALLBACK.len(), 1);
    }

    #[test]
    fn test_label_dispatch() {
        assert_eq!(formulas_for("Justiça Federal").len(), 12);
        assert_eq!(formulas_for("Justiça Estadual").len(), 14);
    }

    #[test]
    fn test_trabalho_catalog() {
        assert_eq!(
            listing(Branch::Trabalho),
            vec![
                (Meta::Meta1, TypeOne),
                (Meta::Meta2A, Generic(PerMille(9.4))),
                (Meta::Meta2Ant, Generic(Percent)),
                (Meta::Meta4A, Generic(PerMille(7.0))),
                (Meta::Meta4B, Generic(Percent)),
            ]
        );
    }

    #[test]
    fn test_federal_meta7a_uses_3_5() {
        let meta7a = branch_formulas(Branch::Federal)
            .iter()
            .find(|s| s.meta == Meta::Meta7A)
            .unwrap();
        assert_eq!(meta7a.formula, Generic(Multiplier::PerMille(3.5)));
    }

    #[test]
    fn test_superior_justica_catalog() {
        let metas: Vec<Meta> = branch_formulas(Branch::SuperiorJustica)
            .iter()
            .map(|s| s.meta)
            .collect();
        assert_eq!(
            metas,
            vec![
                Meta::Meta1,
                Meta::Meta2Ant,
                Meta::Meta4A,
                Meta::Meta4B,
                Meta::Meta6,
                Meta::Meta7A,
                Meta::Meta7B,
                Meta::Meta8,
                Meta::Meta10,
            ]
        );
        assert!(
            branch_formulas(Branch::SuperiorJustica)
                .iter()
                .skip(4)
                .all(|s| matches!(s.formula, Generic(PerMille(d)) if d == 7.5 || d == 10.0))
        );
    }

    #[test]
    fn test_superior_eleitoral_meta4b() {
        assert_eq!(
            listing(Branch::SuperiorEleitoral)[5],
            (Meta::Meta4B, Generic(PerMille(5.0)))
        );
    }

    #[test]
    fn test_military_branches_differ() {
        assert_eq!(
            listing(Branch::MilitarUniao)[1],
            (Meta::Meta2A, Generic(PerMille(9.5)))
        );
        assert_eq!(
            listing(Branch::MilitarEstadual)[1],
            (Meta::Meta2A, Generic(PerMille(9.0)))
        );
        assert_eq!(
            listing(Branch::MilitarEstadual)[2],
            (Meta::Meta2B, Generic(PerMille(9.5)))
        );
    }

    #[test]
    fn test_only_estadual_has_meta2c_and_meta10b() {
        for branch in Branch::ALL {
            let has = branch_formulas(branch)
                .iter()
                .any(|s| s.meta == Meta::Meta2C || s.meta == Meta::Meta10B);
            assert_eq!(has, branch == Branch::Estadual, "{branch}");
        }
    }
}
