//! Error types for the gauge-rnr library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants for tensor validation, analysis state preconditions,
//! configuration, and the preconditions of the statistical primitives.
//!
//! Degenerate designs (a factor with a single level) are deliberately *not*
//! errors: they surface as NaN or infinite statistics in the result.

use thiserror::Error;

/// The main error type for the gauge-rnr library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ State Errors ============
    /// A result or summary was requested before `calculate()` ran.
    #[error("{analysis}.calculate() should be run before requesting results")]
    NotCalculated {
        /// Name of the analysis that has no result yet.
        analysis: &'static str,
    },

    // ============ Tensor Errors ============
    /// One of the three measurement axes has length zero.
    #[error("measurement tensor has no {axis}; every axis needs at least one entry")]
    EmptyDimension {
        /// Name of the empty axis.
        axis: &'static str,
    },

    /// Array dimensions are inconsistent.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension description.
        expected: String,
        /// Actual dimension description.
        actual: String,
    },

    /// A measurement is NaN or infinite.
    #[error("measurement [{operator}, {part}, {measurement}] is not finite")]
    NonFiniteMeasurement {
        /// Operator index.
        operator: usize,
        /// Part index.
        part: usize,
        /// Replicate index.
        measurement: usize,
    },

    // ============ Parameter Validation Errors ============
    /// Invalid configuration or arguments.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },

    // ============ Statistical Primitive Errors ============
    /// A statistical test received too few observations.
    #[error("{test} needs at least {required} observations, got {actual}")]
    InsufficientData {
        /// Name of the test.
        test: &'static str,
        /// Minimum number of observations.
        required: usize,
        /// Number of observations supplied.
        actual: usize,
    },

    /// The sample cannot be tested (for example all values identical).
    #[error("degenerate sample: {message}")]
    DegenerateSample {
        /// Why the sample is degenerate.
        message: String,
    },
}

/// A specialized `Result` type for gauge-rnr operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a new `DimensionMismatch` error.
    #[must_use]
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new `DegenerateSample` error.
    #[must_use]
    pub fn degenerate_sample(message: impl Into<String>) -> Self {
        Self::DegenerateSample {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotCalculated {
            analysis: "GaugeRnR",
        };
        assert!(err.to_string().contains("GaugeRnR.calculate()"));

        let err = Error::EmptyDimension { axis: "parts" };
        assert!(err.to_string().contains("parts"));

        let err = Error::InsufficientData {
            test: "Shapiro-Wilk",
            required: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("Shapiro-Wilk"));
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));

        let err = Error::NonFiniteMeasurement {
            operator: 1,
            part: 4,
            measurement: 0,
        };
        assert!(err.to_string().contains("[1, 4, 0]"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::invalid_params("threshold");
        let err2 = Error::invalid_params("threshold");
        let err3 = Error::invalid_params("tolerance");

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
