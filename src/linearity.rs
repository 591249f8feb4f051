//! Linearity and bias of the gauge.
//!
//! Every observation is compared with the reference value of its part. The
//! residuals are regressed on the reference values; the slope measures how
//! the error changes over the measuring range (linearity) and the intercept
//! the constant offset (bias).
//!
//! Without known reference values the part means are used, which by
//! construction gives zero slope and zero bias. This is still useful as a
//! baseline and for the residual plot data.

use tracing::debug;

use crate::error::{Error, Result};
use crate::stats::{ordinary_least_squares, LinearFit};
use crate::summary::{format_value, Table};
use crate::tensor::MeasurementTensor;

/// Linearity fit result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearityResult {
    /// Slope of residual against reference value.
    pub linearity: f64,
    /// Intercept of the fit.
    pub bias: f64,
    /// Two-sided p-value of the intercept.
    pub p_value: f64,
    /// Two-sided p-value of the slope.
    pub linearity_p_value: f64,
    /// Full least squares fit.
    pub fit: LinearFit,
}

/// Linearity and bias analysis over one tensor.
#[derive(Debug, Clone)]
pub struct Linearity {
    tensor: MeasurementTensor,
    references: Vec<f64>,
    result: Option<LinearityResult>,
}

impl Linearity {
    /// Title used for reports.
    pub const TITLE: &'static str = "Linearity and Bias";

    /// Create the analysis.
    ///
    /// `references` holds one known value per part; `None` uses part means.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if the reference count differs from the part count
    /// * `InvalidParams` if a reference value is not finite
    pub fn new(tensor: MeasurementTensor, references: Option<Vec<f64>>) -> Result<Self> {
        let references = match references {
            Some(values) => {
                if values.len() != tensor.parts() {
                    return Err(Error::dimension_mismatch(
                        format!("{} reference values", tensor.parts()),
                        format!("{} reference values", values.len()),
                    ));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(Error::invalid_params("reference values must be finite"));
                }
                values
            }
            None => tensor.part_slices().iter().map(|s| mean(s)).collect(),
        };

        Ok(Self {
            tensor,
            references,
            result: None,
        })
    }

    /// Reference value per part.
    #[must_use]
    pub fn references(&self) -> &[f64] {
        &self.references
    }

    /// `(reference, residual)` for every observation, part-major.
    #[must_use]
    pub fn residuals(&self) -> (Vec<f64>, Vec<f64>) {
        let mut x = Vec::with_capacity(self.tensor.len());
        let mut y = Vec::with_capacity(self.tensor.len());
        for (slice, &reference) in self.tensor.part_slices().iter().zip(&self.references) {
            for &value in slice {
                x.push(reference);
                y.push(value - reference);
            }
        }
        (x, y)
    }

    /// Fit residual against reference.
    ///
    /// # Errors
    ///
    /// * `InsufficientData` with fewer than three observations
    /// * `DegenerateSample` if every reference value is equal
    pub fn calculate(&mut self) -> Result<&LinearityResult> {
        let (x, y) = self.residuals();
        let fit = ordinary_least_squares(&x, &y)?;
        debug!(
            slope = fit.slope,
            intercept = fit.intercept,
            "fitted linearity"
        );

        Ok(self.result.insert(LinearityResult {
            linearity: fit.slope,
            bias: fit.intercept,
            p_value: fit.intercept_p_value,
            linearity_p_value: fit.slope_p_value,
            fit,
        }))
    }

    /// Result of the last calculation.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn result(&self) -> Result<&LinearityResult> {
        self.result.as_ref().ok_or(Error::NotCalculated {
            analysis: "Linearity",
        })
    }

    /// Single-row table of the fit.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn summary(&self, precision: usize) -> Result<Table> {
        let result = self.result()?;
        let headers = ["Linearity Estimate", "Linearity", "Bias", "P-value"]
            .map(String::from)
            .to_vec();
        let row = vec![
            "Total".to_string(),
            format_value(result.linearity, precision),
            format_value(result.bias, precision),
            format_value(result.p_value, precision),
        ];
        Ok(Table::new(headers, vec![row]).with_title(Self::TITLE))
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
