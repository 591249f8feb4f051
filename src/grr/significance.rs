//! F ratios and p-values for the ANOVA sources.
//!
//! Operator and part are tested against the interaction mean square while
//! the interaction is retained, and against the (pooled) measurement mean
//! square once it has been pooled. The interaction itself is always tested
//! against the pure within-cell error, since that test is what decides
//! whether pooling happens.

use super::types::{Component, ComponentMap};
use crate::stats::f_survival;

/// The pure within-cell (repeatability) error term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorTerm {
    /// Unpooled measurement mean square.
    pub mean_square: f64,
    /// Unpooled measurement degrees of freedom.
    pub degrees_of_freedom: usize,
}

/// Denominator term for the operator and part tests.
#[must_use]
pub fn denominator(pooled: bool) -> Component {
    if pooled {
        Component::Measurement
    } else {
        Component::OperatorByPart
    }
}

/// F ratios for operator, part and interaction.
#[must_use]
pub fn f_ratios(ms: &ComponentMap<f64>, pooled: bool, within: ErrorTerm) -> ComponentMap<f64> {
    let den = ms[denominator(pooled)];

    [
        (Component::Operator, ms[Component::Operator] / den),
        (Component::Part, ms[Component::Part] / den),
        (
            Component::OperatorByPart,
            ms[Component::OperatorByPart] / within.mean_square,
        ),
    ]
    .into_iter()
    .collect()
}

/// One-sided upper-tail p-values for the F ratios.
#[must_use]
pub fn p_values(
    f: &ComponentMap<f64>,
    dof: &ComponentMap<usize>,
    pooled: bool,
    within: ErrorTerm,
) -> ComponentMap<f64> {
    let den_dof = dof[denominator(pooled)];

    [
        (
            Component::Operator,
            f_survival(f[Component::Operator], dof[Component::Operator], den_dof),
        ),
        (
            Component::Part,
            f_survival(f[Component::Part], dof[Component::Part], den_dof),
        ),
        (
            Component::OperatorByPart,
            f_survival(
                f[Component::OperatorByPart],
                dof[Component::OperatorByPart],
                within.degrees_of_freedom,
            ),
        ),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grr::decompose::{mean_squares, VarianceDecomposer};
    use crate::tensor::reference_study;

    fn unpooled_inputs() -> (ComponentMap<usize>, ComponentMap<f64>, ErrorTerm) {
        let tensor = reference_study();
        let decomposer = VarianceDecomposer::new(&tensor);
        let dof = decomposer.degrees_of_freedom(false);
        let ms = mean_squares(&dof, &decomposer.sum_of_squares(false));
        let within = ErrorTerm {
            mean_square: ms[Component::Measurement],
            degrees_of_freedom: dof[Component::Measurement],
        };
        (dof, ms, within)
    }

    #[test]
    fn test_f_ratios_unpooled() {
        let (_, ms, within) = unpooled_inputs();
        let f = f_ratios(&ms, false, within);

        assert!((f[Component::Operator] - 100.322).abs() < 1e-3);
        assert!((f[Component::Part] - 889.458).abs() < 1e-3);
        assert!((f[Component::OperatorByPart] - 0.142).abs() < 1e-3);
        assert!(!f.contains(Component::Total));
    }

    #[test]
    fn test_p_values_unpooled() {
        let (dof, ms, within) = unpooled_inputs();
        let f = f_ratios(&ms, false, within);
        let p = p_values(&f, &dof, false, within);

        assert!(p[Component::Operator] < 1e-3);
        assert!(p[Component::Part] < 1e-3);
        assert!((p[Component::OperatorByPart] - 0.9964).abs() < 1e-4);
    }

    #[test]
    fn test_interaction_test_ignores_pooling() {
        let (dof, ms, within) = unpooled_inputs();
        let f_unpooled = f_ratios(&ms, false, within);

        let mut pooled_ms = ms;
        pooled_ms.insert(Component::Measurement, 0.046_77);
        let f_pooled = f_ratios(&pooled_ms, true, within);

        assert_eq!(
            f_pooled[Component::OperatorByPart],
            f_unpooled[Component::OperatorByPart]
        );
        assert!(f_pooled[Component::Operator] < f_unpooled[Component::Operator]);

        let mut pooled_dof = dof;
        pooled_dof.insert(Component::Measurement, 38);
        let p = p_values(&f_pooled, &pooled_dof, true, within);
        assert!((p[Component::OperatorByPart] - 0.9964).abs() < 1e-4);
    }

    #[test]
    fn test_denominator() {
        assert_eq!(denominator(false), Component::OperatorByPart);
        assert_eq!(denominator(true), Component::Measurement);
    }
}
