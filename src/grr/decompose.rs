//! Degrees of freedom, means, sums of squares and mean squares.
//!
//! Pure arithmetic over the measurement tensor; no inference happens here.
//! With `O` operators, `P` parts and `M` replicates the balanced two-factor
//! identity is
//!
//! ```text
//! SS_total = SS_operator + SS_part + SS_interaction + SS_measurement
//! ```
//!
//! and the interaction sum of squares is obtained as the residual of it.

use ndarray::Axis;

use super::types::{Component, ComponentMap, Means};
use crate::tensor::MeasurementTensor;

/// Computes the arithmetic stages of the ANOVA for one tensor.
#[derive(Debug, Clone, Copy)]
pub struct VarianceDecomposer<'a> {
    tensor: &'a MeasurementTensor,
}

impl<'a> VarianceDecomposer<'a> {
    /// Create a decomposer borrowing the tensor.
    #[must_use]
    pub fn new(tensor: &'a MeasurementTensor) -> Self {
        Self { tensor }
    }

    /// Degrees of freedom per ANOVA source.
    ///
    /// When `pooled`, the interaction's freedom is folded into the
    /// measurement term. A single-level factor yields 0 for its term.
    #[must_use]
    pub fn degrees_of_freedom(&self, pooled: bool) -> ComponentMap<usize> {
        let (o, p, m) = self.tensor.shape();

        let operator = o - 1;
        let part = p - 1;
        let interaction = operator * part;
        let within = o * p * (m - 1);
        let measurement = if pooled { interaction + within } else { within };

        [
            (Component::Operator, operator),
            (Component::Part, part),
            (Component::OperatorByPart, interaction),
            (Component::Measurement, measurement),
            (Component::Total, o * p * m - 1),
        ]
        .into_iter()
        .collect()
    }

    /// Grand, per-operator, per-part and per-cell means.
    #[must_use]
    pub fn means(&self) -> Means {
        let data = self.tensor.data();
        let (o, p, _) = self.tensor.shape();

        let total = data.iter().sum::<f64>() / data.len() as f64;

        let level_means = |axis: usize| -> Vec<f64> {
            data.axis_iter(Axis(axis))
                .map(|slab| slab.iter().sum::<f64>() / slab.len() as f64)
                .collect()
        };

        let mut measurement = Vec::with_capacity(o * p);
        for operator in data.outer_iter() {
            for cell in operator.outer_iter() {
                measurement.push(cell.iter().sum::<f64>() / cell.len() as f64);
            }
        }

        Means {
            total,
            operator: level_means(0),
            part: level_means(1),
            measurement,
        }
    }

    /// Sums of squares per ANOVA source.
    ///
    /// The interaction term is always `total - (operator + part + within)`
    /// using the unpooled within-cell sum; when `pooled` the measurement
    /// term additionally absorbs the interaction.
    #[must_use]
    pub fn sum_of_squares(&self, pooled: bool) -> ComponentMap<f64> {
        let means = self.means();
        self.sum_of_squares_with(&means, pooled)
    }

    pub(crate) fn sum_of_squares_with(&self, means: &Means, pooled: bool) -> ComponentMap<f64> {
        let data = self.tensor.data();
        let (o, p, m) = self.tensor.shape();
        let grand = means.total;

        let total: f64 = data.iter().map(|x| (x - grand).powi(2)).sum();

        let deviations = |levels: &[f64]| -> f64 { levels.iter().map(|x| (x - grand).powi(2)).sum() };
        let operator = (p * m) as f64 * deviations(&means.operator);
        let part = (o * m) as f64 * deviations(&means.part);

        let mut within = 0.0;
        for (i, operator_slab) in data.outer_iter().enumerate() {
            for (j, cell) in operator_slab.outer_iter().enumerate() {
                let cell_mean = means.measurement[i * p + j];
                within += cell.iter().map(|x| (x - cell_mean).powi(2)).sum::<f64>();
            }
        }

        let interaction = total - (operator + part + within);
        let measurement = if pooled { within + interaction } else { within };

        [
            (Component::Operator, operator),
            (Component::Part, part),
            (Component::OperatorByPart, interaction),
            (Component::Measurement, measurement),
            (Component::Total, total),
        ]
        .into_iter()
        .collect()
    }
}

/// `SS / DF` for every component present in both maps.
///
/// A zero DF gives NaN or infinity, which is passed on to the caller.
#[must_use]
pub fn mean_squares(dof: &ComponentMap<usize>, ss: &ComponentMap<f64>) -> ComponentMap<f64> {
    ss.iter()
        .filter_map(|(c, &s)| dof.get(c).map(|&d| (c, s / d as f64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::reference_study;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_degrees_of_freedom() {
        let tensor = reference_study();
        let dof = VarianceDecomposer::new(&tensor).degrees_of_freedom(false);

        assert_eq!(dof[Component::Operator], 2);
        assert_eq!(dof[Component::Part], 4);
        assert_eq!(dof[Component::OperatorByPart], 8);
        assert_eq!(dof[Component::Measurement], 30);
        assert_eq!(dof[Component::Total], 44);
    }

    #[test]
    fn test_degrees_of_freedom_pooled() {
        let tensor = reference_study();
        let dof = VarianceDecomposer::new(&tensor).degrees_of_freedom(true);

        assert_eq!(dof[Component::Measurement], 38);
        assert_eq!(dof[Component::Total], 44);
        assert_eq!(
            dof[Component::Operator] + dof[Component::Part] + dof[Component::Measurement],
            dof[Component::Total]
        );
    }

    #[test]
    fn test_means() {
        let tensor = reference_study();
        let means = VarianceDecomposer::new(&tensor).means();

        assert_close(means.total, 2.9437, 1e-3);

        let expected_operator = [3.1567, 2.98, 2.6947];
        for (a, e) in means.operator.iter().zip(expected_operator) {
            assert_close(*a, e, 1e-3);
        }

        let expected_part = [3.1689, 2.1489, 4.0989, 3.3667, 1.9356];
        for (a, e) in means.part.iter().zip(expected_part) {
            assert_close(*a, e, 1e-3);
        }

        let expected_cells = [
            3.447, 2.393, 4.260, 3.537, 2.147, 3.133, 2.210, 4.157, 3.413, 1.987, 2.927, 1.843,
            3.880, 3.150, 1.673,
        ];
        assert_eq!(means.measurement.len(), 15);
        for (a, e) in means.measurement.iter().zip(expected_cells) {
            assert_close(*a, e, 1e-3);
        }
    }

    #[test]
    fn test_sum_of_squares() {
        let tensor = reference_study();
        let ss = VarianceDecomposer::new(&tensor).sum_of_squares(false);

        assert_close(ss[Component::Total], 32.317, 1e-3);
        assert_close(ss[Component::Operator], 1.630, 1e-3);
        assert_close(ss[Component::Part], 28.909, 1e-3);
        assert_close(ss[Component::OperatorByPart], 0.065, 1e-3);
        assert_close(ss[Component::Measurement], 1.712, 1e-3);
    }

    #[test]
    fn test_sum_of_squares_pooled() {
        let tensor = reference_study();
        let decomposer = VarianceDecomposer::new(&tensor);
        let unpooled = decomposer.sum_of_squares(false);
        let pooled = decomposer.sum_of_squares(true);

        assert_close(
            pooled[Component::Measurement],
            unpooled[Component::Measurement] + unpooled[Component::OperatorByPart],
            1e-12,
        );
        // The interaction itself is not double counted
        assert_close(
            pooled[Component::OperatorByPart],
            unpooled[Component::OperatorByPart],
            1e-12,
        );
        assert_close(
            pooled[Component::Operator] + pooled[Component::Part] + pooled[Component::Measurement],
            pooled[Component::Total],
            1e-9,
        );
    }

    #[test]
    fn test_mean_squares() {
        let tensor = reference_study();
        let decomposer = VarianceDecomposer::new(&tensor);
        let ms = mean_squares(
            &decomposer.degrees_of_freedom(false),
            &decomposer.sum_of_squares(false),
        );

        assert_close(ms[Component::Operator], 0.815, 1e-3);
        assert_close(ms[Component::Part], 7.227, 1e-3);
        assert_close(ms[Component::OperatorByPart], 0.008, 1e-3);
        assert_close(ms[Component::Measurement], 0.057, 1e-3);
    }

    #[test]
    fn test_mean_squares_zero_dof_is_surfaced() {
        let tensor = MeasurementTensor::from_nested(&[vec![
            vec![1.0, 1.2],
            vec![2.0, 2.3],
        ]])
        .unwrap();
        let decomposer = VarianceDecomposer::new(&tensor);
        let ms = mean_squares(
            &decomposer.degrees_of_freedom(false),
            &decomposer.sum_of_squares(false),
        );

        // One operator: 0/0 for the operator and interaction terms
        assert!(ms[Component::Operator].is_nan());
        assert!(!ms[Component::Operator].is_finite());
        assert!(ms[Component::Part].is_finite());
    }

    #[test]
    fn test_mean_squares_skips_missing() {
        let mut dof = ComponentMap::new();
        dof.insert(Component::Part, 2);
        let mut ss = ComponentMap::new();
        ss.insert(Component::Part, 4.0);
        ss.insert(Component::Total, 9.0);

        let ms = mean_squares(&dof, &ss);
        assert_eq!(ms[Component::Part], 2.0);
        assert!(!ms.contains(Component::Total));
    }
}
