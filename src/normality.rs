//! Normality of the measurements.
//!
//! Runs the Shapiro-Wilk test on the whole study, on every operator's
//! observations and on every part's observations. A low p-value in one
//! stratum points at an operator or part whose readings are not normally
//! distributed, which undermines the ANOVA assumptions.

use tracing::debug;

use crate::error::{Error, Result};
use crate::stats::{shapiro_wilk, ShapiroWilk};
use crate::summary::{format_value, stratum_rows, Table};
use crate::tensor::MeasurementTensor;

/// Shapiro-Wilk results per stratum.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalityResult {
    /// Test on every observation.
    pub total: ShapiroWilk,
    /// One test per operator.
    pub operators: Vec<ShapiroWilk>,
    /// One test per part.
    pub parts: Vec<ShapiroWilk>,
}

/// Shapiro-Wilk normality analysis over one tensor.
#[derive(Debug, Clone)]
pub struct Normality {
    tensor: MeasurementTensor,
    result: Option<NormalityResult>,
}

impl Normality {
    /// Title used for reports.
    pub const TITLE: &'static str = "Normality";

    /// Create the analysis.
    #[must_use]
    pub fn new(tensor: MeasurementTensor) -> Self {
        Self {
            tensor,
            result: None,
        }
    }

    /// Test every stratum.
    ///
    /// # Errors
    ///
    /// * `InsufficientData` if a stratum has fewer than three observations
    /// * `DegenerateSample` if all observations of a stratum are equal
    pub fn calculate(&mut self) -> Result<&NormalityResult> {
        let total = shapiro_wilk(&self.tensor.flatten())?;
        let operators = self
            .tensor
            .operator_slices()
            .iter()
            .map(|s| shapiro_wilk(s))
            .collect::<Result<Vec<_>>>()?;
        let parts = self
            .tensor
            .part_slices()
            .iter()
            .map(|s| shapiro_wilk(s))
            .collect::<Result<Vec<_>>>()?;
        debug!(w = total.w, p_value = total.p_value, "tested normality");

        Ok(self.result.insert(NormalityResult {
            total,
            operators,
            parts,
        }))
    }

    /// Result of the last calculation.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn result(&self) -> Result<&NormalityResult> {
        self.result.as_ref().ok_or(Error::NotCalculated {
            analysis: "Normality",
        })
    }

    /// W and p-value for the total, each operator and each part.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn summary(&self, precision: usize) -> Result<Table> {
        let result = self.result()?;
        let cells = |sw: &ShapiroWilk| {
            vec![
                format_value(sw.w, precision),
                format_value(sw.p_value, precision),
            ]
        };

        let rows = stratum_rows(
            &self.tensor,
            cells(&result.total),
            result.operators.iter().map(cells).collect(),
            result.parts.iter().map(cells).collect(),
        );
        let headers = ["Sources of Normality", "W", "P-value"]
            .map(String::from)
            .to_vec();

        Ok(Table::new(headers, rows).with_title(Self::TITLE))
    }
}
