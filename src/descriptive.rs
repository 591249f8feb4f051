//! Mean and spread per stratum.

use statrs::statistics::Statistics;

use crate::error::{Error, Result};
use crate::summary::{format_value, stratum_rows, Table};
use crate::tensor::MeasurementTensor;

/// Mean and sample standard deviation of one stratum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Moments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for one value.
    pub std_dev: f64,
}

impl Moments {
    fn of(values: &[f64]) -> Self {
        Self {
            mean: values.mean(),
            std_dev: values.std_dev(),
        }
    }
}

/// Moments for the whole study, each operator and each part.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptiveResult {
    /// Every observation.
    pub total: Moments,
    /// One entry per operator.
    pub operators: Vec<Moments>,
    /// One entry per part.
    pub parts: Vec<Moments>,
}

/// Descriptive statistics over one tensor.
#[derive(Debug, Clone)]
pub struct Descriptive {
    tensor: MeasurementTensor,
    result: Option<DescriptiveResult>,
}

impl Descriptive {
    /// Title used for reports.
    pub const TITLE: &'static str = "Statistics";

    /// Create the analysis.
    #[must_use]
    pub fn new(tensor: MeasurementTensor) -> Self {
        Self {
            tensor,
            result: None,
        }
    }

    /// Compute the moments.
    pub fn calculate(&mut self) -> &DescriptiveResult {
        let total = Moments::of(&self.tensor.flatten());
        let operators = self
            .tensor
            .operator_slices()
            .iter()
            .map(|s| Moments::of(s))
            .collect();
        let parts = self
            .tensor
            .part_slices()
            .iter()
            .map(|s| Moments::of(s))
            .collect();

        self.result.insert(DescriptiveResult {
            total,
            operators,
            parts,
        })
    }

    /// Result of the last calculation.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn result(&self) -> Result<&DescriptiveResult> {
        self.result.as_ref().ok_or(Error::NotCalculated {
            analysis: "Statistics",
        })
    }

    /// Mean and standard deviation per stratum.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn summary(&self, precision: usize) -> Result<Table> {
        let result = self.result()?;
        let cells = |m: &Moments| {
            vec![
                format_value(m.mean, precision),
                format_value(m.std_dev, precision),
            ]
        };

        let rows = stratum_rows(
            &self.tensor,
            cells(&result.total),
            result.operators.iter().map(cells).collect(),
            result.parts.iter().map(cells).collect(),
        );
        let headers = ["Sources of Variance", "Mean", "Std"]
            .map(String::from)
            .to_vec();

        Ok(Table::new(headers, rows).with_title(Self::TITLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::reference_study;

    #[test]
    fn test_reference_study() {
        let mut descriptive = Descriptive::new(reference_study());
        let result = descriptive.calculate().clone();

        assert!((result.total.mean - 2.943_78).abs() < 1e-4);
        assert!((result.total.std_dev - 0.857_01).abs() < 1e-4);

        let operators = [(3.156_67, 0.813_10), (2.98, 0.879_44), (2.694_67, 0.870_25)];
        for (m, (mean, std)) in result.operators.iter().zip(operators) {
            assert!((m.mean - mean).abs() < 1e-4);
            assert!((m.std_dev - std).abs() < 1e-4);
        }

        let parts = [
            (3.168_89, 0.253_74),
            (2.148_89, 0.329_30),
            (4.098_89, 0.228_06),
            (3.366_67, 0.324_65),
            (1.935_56, 0.309_36),
        ];
        for (m, (mean, std)) in result.parts.iter().zip(parts) {
            assert!((m.mean - mean).abs() < 1e-4);
            assert!((m.std_dev - std).abs() < 1e-4);
        }
    }

    #[test]
    fn test_single_observation_has_no_spread() {
        let tensor = MeasurementTensor::from_nested(&[vec![vec![4.2]]]).unwrap();
        let mut descriptive = Descriptive::new(tensor);
        let result = descriptive.calculate();

        assert_eq!(result.total.mean, 4.2);
        assert!(result.total.std_dev.is_nan());
    }

    #[test]
    fn test_summary() {
        let mut descriptive = Descriptive::new(reference_study());
        assert!(descriptive.summary(2).is_err());

        descriptive.calculate();
        let table = descriptive.summary(2).unwrap();

        assert_eq!(table.title(), Some("Statistics"));
        assert_eq!(table.rows().len(), 9);
        assert_eq!(table.cell(0, 1), Some("2.94"));
        assert_eq!(table.cell(3, 0), Some("Operator 2"));
        assert_eq!(table.cell(8, 2), Some("0.31"));
    }
}
