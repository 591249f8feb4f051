//! The measurement tensor shared by every analysis.
//!
//! A Gauge R&R study is a 3-dimensional array `x[i, j, k]` where `i` is the
//! operator, `j` the part and `k` the repeated measurement (replicate).
//! Stored to a delimited file the same data would look like:
//!
//! ```text
//! m1    m2    m3
//! 3.29; 3.41; 3.64  # p1 | o1
//! 2.44; 2.32; 2.42  # p2
//! 3.08; 3.25; 3.07  # p1 | o2
//! 2.53; 1.78; 2.32  # p2
//! ```
//!
//! Loading such files and reordering axes is left to the caller; this module
//! only validates and holds the array.

use ndarray::{Array3, Axis};
use std::fmt;

use crate::error::{Error, Result};

/// Immutable `[operator, part, measurement]` array of observations.
///
/// Every axis has at least one entry and every value is finite. A design
/// with a single operator or part is accepted; its statistics come out as
/// NaN or infinity instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTensor {
    data: Array3<f64>,
    operator_labels: Vec<String>,
    part_labels: Vec<String>,
}

impl MeasurementTensor {
    /// Wrap an existing array.
    ///
    /// # Errors
    ///
    /// Returns an error if any axis is empty or any value is NaN/infinite.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let (operators, parts, measurements) = data.dim();
        for (len, axis) in [
            (operators, "operators"),
            (parts, "parts"),
            (measurements, "measurements"),
        ] {
            if len == 0 {
                return Err(Error::EmptyDimension { axis });
            }
        }

        if let Some(((operator, part, measurement), _)) =
            data.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(Error::NonFiniteMeasurement {
                operator,
                part,
                measurement,
            });
        }

        Ok(Self {
            data,
            operator_labels: (0..operators).map(|i| format!("Operator {i}")).collect(),
            part_labels: (0..parts).map(|j| format!("Part {j}")).collect(),
        })
    }

    /// Build a tensor from nested vectors indexed `[operator][part][measurement]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the nesting is ragged, any axis is empty, or any
    /// value is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use gauge_rnr::MeasurementTensor;
    ///
    /// let tensor = MeasurementTensor::from_nested(&[
    ///     vec![vec![1.0, 1.1], vec![2.0, 2.1]],
    ///     vec![vec![1.2, 1.0], vec![2.2, 1.9]],
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(tensor.shape(), (2, 2, 2));
    /// ```
    pub fn from_nested(values: &[Vec<Vec<f64>>]) -> Result<Self> {
        let operators = values.len();
        let parts = values.first().map_or(0, Vec::len);
        let measurements = values
            .first()
            .and_then(|o| o.first())
            .map_or(0, Vec::len);

        let mut flat = Vec::with_capacity(operators * parts * measurements);
        for (i, operator) in values.iter().enumerate() {
            if operator.len() != parts {
                return Err(Error::dimension_mismatch(
                    format!("{parts} parts"),
                    format!("{} parts for operator {i}", operator.len()),
                ));
            }
            for (j, part) in operator.iter().enumerate() {
                if part.len() != measurements {
                    return Err(Error::dimension_mismatch(
                        format!("{measurements} measurements"),
                        format!("{} measurements for operator {i}, part {j}", part.len()),
                    ));
                }
                flat.extend_from_slice(part);
            }
        }

        let data = Array3::from_shape_vec((operators, parts, measurements), flat)
            .map_err(|e| Error::dimension_mismatch("a regular 3-d array", e.to_string()))?;
        Self::new(data)
    }

    /// Replace the default operator and part labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the label counts do not match the axis lengths.
    pub fn with_labels(mut self, operators: Vec<String>, parts: Vec<String>) -> Result<Self> {
        if operators.len() != self.operators() {
            return Err(Error::invalid_params(format!(
                "{} operator labels given for {} operators",
                operators.len(),
                self.operators()
            )));
        }
        if parts.len() != self.parts() {
            return Err(Error::invalid_params(format!(
                "{} part labels given for {} parts",
                parts.len(),
                self.parts()
            )));
        }
        self.operator_labels = operators;
        self.part_labels = parts;
        Ok(self)
    }

    /// Number of operators (axis 0).
    #[must_use]
    pub fn operators(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Number of parts (axis 1).
    #[must_use]
    pub fn parts(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Number of repeated measurements per operator and part (axis 2).
    #[must_use]
    pub fn measurements(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// `(operators, parts, measurements)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Total number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; an empty tensor cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying array.
    #[must_use]
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Operator labels, `"Operator {i}"` unless replaced.
    #[must_use]
    pub fn operator_labels(&self) -> &[String] {
        &self.operator_labels
    }

    /// Part labels, `"Part {j}"` unless replaced.
    #[must_use]
    pub fn part_labels(&self) -> &[String] {
        &self.part_labels
    }

    /// All observations in `[operator, part, measurement]` order.
    #[must_use]
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Every observation made by one operator, part-major.
    ///
    /// # Panics
    ///
    /// Panics if `operator` is out of bounds.
    #[must_use]
    pub fn operator_slice(&self, operator: usize) -> Vec<f64> {
        self.data.index_axis(Axis(0), operator).iter().copied().collect()
    }

    /// Every observation of one part, operator-major.
    ///
    /// # Panics
    ///
    /// Panics if `part` is out of bounds.
    #[must_use]
    pub fn part_slice(&self, part: usize) -> Vec<f64> {
        self.data.index_axis(Axis(1), part).iter().copied().collect()
    }

    /// Per-operator slices, one row per operator.
    #[must_use]
    pub fn operator_slices(&self) -> Vec<Vec<f64>> {
        (0..self.operators()).map(|i| self.operator_slice(i)).collect()
    }

    /// Per-part slices, one row per part.
    #[must_use]
    pub fn part_slices(&self) -> Vec<Vec<f64>> {
        (0..self.parts()).map(|j| self.part_slice(j)).collect()
    }
}

impl fmt::Display for MeasurementTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (o, p, m) = self.shape();
        write!(f, "Shape: [{o}, {p}, {m}]")
    }
}

/// The 3 operators × 5 parts × 3 replicates study used throughout the tests.
#[cfg(test)]
pub(crate) fn reference_study() -> MeasurementTensor {
    MeasurementTensor::from_nested(&[
        vec![
            vec![3.29, 3.41, 3.64],
            vec![2.44, 2.32, 2.42],
            vec![4.34, 4.17, 4.27],
            vec![3.47, 3.5, 3.64],
            vec![2.2, 2.08, 2.16],
        ],
        vec![
            vec![3.08, 3.25, 3.07],
            vec![2.53, 1.78, 2.32],
            vec![4.19, 3.94, 4.34],
            vec![3.01, 4.03, 3.2],
            vec![2.44, 1.8, 1.72],
        ],
        vec![
            vec![3.04, 2.89, 2.85],
            vec![1.62, 1.87, 2.04],
            vec![3.88, 4.09, 3.67],
            vec![3.14, 3.2, 3.11],
            vec![1.54, 1.93, 1.55],
        ],
    ])
    .expect("reference study is well formed")
}
