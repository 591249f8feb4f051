//! Gauge R&R variance decomposition.
//!
//! This module implements the crossed two-factor ANOVA method for a Gauge
//! R&R study:
//! - Degrees of freedom, means, sums of squares and mean squares
//! - Variance components with negative estimates clamped to zero
//! - F ratios and p-values
//! - Pooling of an insignificant operator × part interaction
//!
//! ## Quick Start
//!
//! ```rust
//! use gauge_rnr::{GaugeRnR, MeasurementTensor};
//! use gauge_rnr::grr::{Component, GrrConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 2 operators × 3 parts × 2 replicates
//! let tensor = MeasurementTensor::from_nested(&[
//!     vec![vec![10.1, 10.3], vec![12.0, 12.2], vec![8.9, 9.0]],
//!     vec![vec![10.4, 10.2], vec![12.5, 12.1], vec![9.3, 9.1]],
//! ])?;
//!
//! let config = GrrConfig {
//!     p_interaction_threshold: 0.25,
//!     ..Default::default()
//! };
//! let mut grr = GaugeRnR::with_config(tensor, config)?;
//! let result = grr.calculate();
//!
//! println!("σ²(GRR) = {:.4}", result.variance[Component::GaugeRnR]);
//! println!("{}", grr.summary(3)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pooling
//!
//! The operator × part interaction is tested against the within-cell error.
//! If its p-value exceeds [`GrrConfig::p_interaction_threshold`] the
//! interaction is folded into the error term and the whole table is
//! recomputed once. The default threshold of 1.0 never pools; 0.25 is the
//! customary choice. Pooling is sticky for the lifetime of the engine.

pub mod decompose;
pub mod significance;
mod types;
pub mod variance;

pub use decompose::{mean_squares, VarianceDecomposer};
pub use significance::ErrorTerm;
pub use types::{Component, ComponentMap, GrrConfig, GrrResult, Means, Statistic};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::summary::{format_value, Table};
use crate::tensor::MeasurementTensor;

/// Gauge R&R engine wrapping one study.
///
/// Holds the tensor, the configuration, the pooling state and the result of
/// the last [`calculate`](Self::calculate).
#[derive(Debug, Clone)]
pub struct GaugeRnR {
    tensor: MeasurementTensor,
    config: GrrConfig,
    interaction_pooled: bool,
    result: Option<GrrResult>,
}

impl GaugeRnR {
    /// Title used for reports.
    pub const TITLE: &'static str = "Gauge R&R";

    /// Create an engine with the default configuration (never pools).
    #[must_use]
    pub fn new(tensor: MeasurementTensor) -> Self {
        Self {
            tensor,
            config: GrrConfig::default(),
            interaction_pooled: false,
            result: None,
        }
    }

    /// Create an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(tensor: MeasurementTensor, config: GrrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tensor,
            interaction_pooled: config.pool_interaction,
            config,
            result: None,
        })
    }

    /// The study data.
    #[must_use]
    pub fn tensor(&self) -> &MeasurementTensor {
        &self.tensor
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &GrrConfig {
        &self.config
    }

    /// Whether the interaction is currently pooled into the error term.
    #[must_use]
    pub fn interaction_pooled(&self) -> bool {
        self.interaction_pooled
    }

    /// Run the ANOVA.
    ///
    /// Computes the unpooled table (unless pooling is already in effect),
    /// decides whether to pool the interaction and, if so, recomputes the
    /// table once with pooled formulas. Pooling is never undone, so a second
    /// call on a pooled engine returns an identical result.
    pub fn calculate(&mut self) -> &GrrResult {
        let mut result = self.run_pass();

        if !self.interaction_pooled {
            let p_interaction = result.p_value[Component::OperatorByPart];
            // NaN never compares greater, so degenerate designs stay unpooled.
            if p_interaction > self.config.p_interaction_threshold {
                debug!(
                    p_interaction,
                    threshold = self.config.p_interaction_threshold,
                    "interaction not significant, pooling into measurement error"
                );
                self.interaction_pooled = true;
                result = self.run_pass();
            } else {
                debug!(
                    p_interaction,
                    threshold = self.config.p_interaction_threshold,
                    "interaction retained"
                );
            }
        }

        if result.f_value.iter().any(|(_, f)| !f.is_finite()) {
            warn!(
                shape = ?self.tensor.shape(),
                "degenerate design: some F ratios are undefined"
            );
        }

        self.result.insert(result)
    }

    /// One pass of the pipeline with the current pooling state.
    fn run_pass(&self) -> GrrResult {
        let pooled = self.interaction_pooled;
        let decomposer = VarianceDecomposer::new(&self.tensor);

        let degrees_of_freedom = decomposer.degrees_of_freedom(pooled);
        let mean = decomposer.means();
        let sum_of_squares = decomposer.sum_of_squares_with(&mean, pooled);
        let mean_square = mean_squares(&degrees_of_freedom, &sum_of_squares);
        debug!(pooled, "decomposed sums of squares");

        let within = if pooled {
            let dof = decomposer.degrees_of_freedom(false);
            let ss = decomposer.sum_of_squares_with(&mean, false);
            ErrorTerm {
                mean_square: ss[Component::Measurement] / dof[Component::Measurement] as f64,
                degrees_of_freedom: dof[Component::Measurement],
            }
        } else {
            ErrorTerm {
                mean_square: mean_square[Component::Measurement],
                degrees_of_freedom: degrees_of_freedom[Component::Measurement],
            }
        };

        let variance = variance::variance_components(&mean_square, self.tensor.shape(), pooled);
        let std_dev = variance::std_devs(&variance);

        let f_value = significance::f_ratios(&mean_square, pooled, within);
        let p_value = significance::p_values(&f_value, &degrees_of_freedom, pooled, within);

        GrrResult {
            degrees_of_freedom,
            mean,
            sum_of_squares,
            mean_square,
            variance,
            std_dev,
            f_value,
            p_value,
            interaction_pooled: pooled,
        }
    }

    /// Result of the last calculation.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` if [`calculate`](Self::calculate) has not run.
    pub fn result(&self) -> Result<&GrrResult> {
        self.result.as_ref().ok_or(Error::NotCalculated {
            analysis: "GaugeRnR",
        })
    }

    /// `σ²_GRR / σ²_total`.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn grr_contribution(&self) -> Result<f64> {
        Ok(self.result()?.grr_contribution())
    }

    /// `σ_GRR / σ_total` (%study variation as a fraction).
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn study_variation(&self) -> Result<f64> {
        Ok(self.result()?.study_variation())
    }

    /// Number of distinct categories, `√2 · σ_part / σ_measurement`.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn distinct_categories(&self) -> Result<f64> {
        Ok(self.result()?.distinct_categories())
    }

    /// `6 σ_GRR / tolerance`, or `None` without a configured tolerance.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn percent_tolerance(&self) -> Result<Option<f64>> {
        let result = self.result()?;
        Ok(self.config.tolerance.map(|t| result.tolerance_ratio(t)))
    }

    /// ANOVA table: one row per component, one column per statistic.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn summary(&self, precision: usize) -> Result<Table> {
        let result = self.result()?;

        let mut headers = vec!["Sources of Variance".to_string()];
        headers.extend(Statistic::TABLE_COLUMNS.iter().map(|s| s.name().to_string()));

        let rows = Component::ALL
            .iter()
            .map(|&component| {
                let mut row = vec![component.name().to_string()];
                row.extend(Statistic::TABLE_COLUMNS.iter().map(|&statistic| {
                    result
                        .scalar(statistic, component)
                        .map(|v| match statistic {
                            Statistic::DegreesOfFreedom => format_value(v, 0),
                            _ => format_value(v, precision),
                        })
                        .unwrap_or_default()
                }));
                row
            })
            .collect();

        Ok(Table::new(headers, rows).with_title(Self::TITLE))
    }

    /// Derived metrics as a two-column table.
    ///
    /// # Errors
    ///
    /// Returns `NotCalculated` before [`calculate`](Self::calculate).
    pub fn metrics_summary(&self, precision: usize) -> Result<Table> {
        let result = self.result()?;

        let mut rows = vec![
            vec![
                "%Contribution (GRR)".to_string(),
                format_value(100.0 * result.grr_contribution(), precision),
            ],
            vec![
                "%Study Variation (GRR)".to_string(),
                format_value(100.0 * result.study_variation(), precision),
            ],
            vec![
                "Distinct Categories".to_string(),
                format_value(result.distinct_categories(), precision),
            ],
        ];
        if let Some(ratio) = self.percent_tolerance()? {
            rows.push(vec![
                "%Tolerance (GRR)".to_string(),
                format_value(100.0 * ratio, precision),
            ]);
        }
        rows.push(vec![
            "Interaction pooled".to_string(),
            result.interaction_pooled.to_string(),
        ]);

        Ok(Table::new(
            vec!["Metric".to_string(), "Value".to_string()],
            rows,
        ))
    }
}

/// Run a Gauge R&R study in one call.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn analyze(tensor: MeasurementTensor, config: GrrConfig) -> Result<GrrResult> {
    let mut grr = GaugeRnR::with_config(tensor, config)?;
    Ok(grr.calculate().clone())
}
