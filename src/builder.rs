//! Builder pattern for setting up a Gauge R&R study.
//!
//! The builder collects the measurements, optional labels and the analysis
//! options, validates them together and hands back a ready [`GaugeRnR`]
//! engine.
//!
//! # Example
//!
//! ```
//! use gauge_rnr::GaugeStudyBuilder;
//!
//! let mut grr = GaugeStudyBuilder::new()
//!     .data(vec![
//!         vec![vec![2.1, 2.2], vec![3.4, 3.3], vec![1.0, 1.1]],
//!         vec![vec![2.0, 2.3], vec![3.5, 3.6], vec![1.2, 1.0]],
//!     ])
//!     .operator_labels(["Alice", "Bob"])
//!     .interaction_threshold(0.25)
//!     .tolerance(4.0)
//!     .build()
//!     .unwrap();
//!
//! grr.calculate();
//! assert_eq!(grr.tensor().operator_labels()[1], "Bob");
//! assert!(grr.percent_tolerance().unwrap().is_some());
//! ```

use crate::error::{Error, Result};
use crate::grr::{GaugeRnR, GrrConfig};
use crate::tensor::MeasurementTensor;

#[derive(Debug, Clone)]
enum Source {
    Nested(Vec<Vec<Vec<f64>>>),
    Tensor(MeasurementTensor),
}

/// Builder for a [`GaugeRnR`] engine.
///
/// # Example
///
/// ```
/// use gauge_rnr::{GaugeStudyBuilder, MeasurementTensor};
/// use ndarray::Array3;
///
/// let data = Array3::from_shape_fn((2, 3, 2), |(i, j, k)| {
///     j as f64 + 0.1 * i as f64 + 0.05 * k as f64
/// });
/// let tensor = MeasurementTensor::new(data).unwrap();
///
/// let grr = GaugeStudyBuilder::new()
///     .tensor(tensor)
///     .pooled(true)
///     .build()
///     .unwrap();
///
/// assert!(grr.interaction_pooled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GaugeStudyBuilder {
    source: Option<Source>,
    operator_labels: Option<Vec<String>>,
    part_labels: Option<Vec<String>>,
    config: GrrConfig,
}

impl GaugeStudyBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurements nested as `[operator][part][measurement]`.
    #[must_use]
    pub fn data(mut self, values: Vec<Vec<Vec<f64>>>) -> Self {
        self.source = Some(Source::Nested(values));
        self
    }

    /// Use an already validated tensor.
    #[must_use]
    pub fn tensor(mut self, tensor: MeasurementTensor) -> Self {
        self.source = Some(Source::Tensor(tensor));
        self
    }

    /// One label per operator.
    #[must_use]
    pub fn operator_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operator_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// One label per part.
    #[must_use]
    pub fn part_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.part_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Pool the interaction when its p-value exceeds `threshold`.
    ///
    /// Default is 1.0, which never pools.
    #[must_use]
    pub fn interaction_threshold(mut self, threshold: f64) -> Self {
        self.config.p_interaction_threshold = threshold;
        self
    }

    /// Start with the interaction already pooled.
    #[must_use]
    pub fn pooled(mut self, pooled: bool) -> Self {
        self.config.pool_interaction = pooled;
        self
    }

    /// Tolerance band width (USL - LSL).
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = Some(tolerance);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: GrrConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate everything and create the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No measurements were supplied
    /// - The nested data is ragged, empty or contains non-finite values
    /// - A label count does not match its axis
    /// - The configuration is invalid
    pub fn build(self) -> Result<GaugeRnR> {
        let tensor = match self.source {
            Some(Source::Nested(values)) => MeasurementTensor::from_nested(&values)?,
            Some(Source::Tensor(tensor)) => tensor,
            None => return Err(Error::invalid_params("measurements must be specified")),
        };

        let tensor = if self.operator_labels.is_some() || self.part_labels.is_some() {
            let operators = self
                .operator_labels
                .unwrap_or_else(|| tensor.operator_labels().to_vec());
            let parts = self
                .part_labels
                .unwrap_or_else(|| tensor.part_labels().to_vec());
            tensor.with_labels(operators, parts)?
        } else {
            tensor
        };

        GaugeRnR::with_config(tensor, self.config)
    }
}

/// Create an engine from nested data with a pooling threshold.
///
/// # Errors
///
/// Returns an error if the data or the threshold is invalid.
///
/// # Example
///
/// ```
/// use gauge_rnr::builder::gauge_study;
///
/// let grr = gauge_study(
///     vec![
///         vec![vec![1.0, 1.1], vec![2.0, 2.1]],
///         vec![vec![1.2, 1.0], vec![2.2, 1.9]],
///     ],
///     0.25,
/// )
/// .unwrap();
///
/// assert_eq!(grr.tensor().shape(), (2, 2, 2));
/// ```
pub fn gauge_study(values: Vec<Vec<Vec<f64>>>, p_interaction_threshold: f64) -> Result<GaugeRnR> {
    GaugeStudyBuilder::new()
        .data(values)
        .interaction_threshold(p_interaction_threshold)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grr::Component;
    use crate::tensor::reference_study;

    fn nested() -> Vec<Vec<Vec<f64>>> {
        vec![
            vec![vec![1.0, 1.1], vec![2.0, 2.1], vec![3.0, 3.2]],
            vec![vec![1.2, 1.0], vec![2.2, 1.9], vec![3.1, 2.9]],
        ]
    }

    #[test]
    fn test_builder_basic() {
        let grr = GaugeStudyBuilder::new().data(nested()).build().unwrap();

        assert_eq!(grr.tensor().shape(), (2, 3, 2));
        assert_eq!(grr.config(), &GrrConfig::default());
        assert!(!grr.interaction_pooled());
    }

    #[test]
    fn test_builder_reference_study_pools() {
        let mut grr = GaugeStudyBuilder::new()
            .tensor(reference_study())
            .interaction_threshold(0.25)
            .build()
            .unwrap();

        let result = grr.calculate();
        assert!(result.interaction_pooled);
        assert_eq!(result.degrees_of_freedom[Component::Measurement], 38);
    }

    #[test]
    fn test_builder_labels() {
        let grr = GaugeStudyBuilder::new()
            .data(nested())
            .part_labels(["A", "B", "C"])
            .build()
            .unwrap();

        assert_eq!(grr.tensor().part_labels(), ["A", "B", "C"]);
        // Unspecified labels keep their defaults
        assert_eq!(grr.tensor().operator_labels()[0], "Operator 0");
    }

    #[test]
    fn test_builder_missing_data() {
        let result = GaugeStudyBuilder::new().interaction_threshold(0.25).build();
        assert!(matches!(result, Err(Error::InvalidParams { .. })));
    }

    #[test]
    fn test_builder_ragged_data() {
        let mut values = nested();
        values[1][2].push(3.3);
        let result = GaugeStudyBuilder::new().data(values).build();
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_builder_label_count_mismatch() {
        let result = GaugeStudyBuilder::new()
            .data(nested())
            .operator_labels(["only one"])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_invalid_threshold() {
        let result = GaugeStudyBuilder::new()
            .data(nested())
            .interaction_threshold(1.5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_invalid_tolerance() {
        let result = GaugeStudyBuilder::new()
            .data(nested())
            .tolerance(-1.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_gauge_study_convenience() {
        let mut grr = gauge_study(nested(), 0.5).unwrap();
        assert_eq!(grr.config().p_interaction_threshold, 0.5);
        grr.calculate();
        assert!(grr.result().is_ok());
    }
}
