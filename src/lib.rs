//! # gauge-rnr
//!
//! Gauge repeatability & reproducibility (Gauge R&R) studies for
//! measurement system analysis.
//!
//! ## Overview
//!
//! A Gauge R&R study has several operators measure the same set of parts
//! several times. The observed variation is split into:
//! - **Repeatability**: the gauge itself (within-cell measurement error)
//! - **Reproducibility**: differences between operators, and the operator ×
//!   part interaction
//! - **Part variation**: what the gauge is supposed to detect
//!
//! This library provides:
//! - A two-factor crossed ANOVA with adaptive pooling of an insignificant
//!   interaction term
//! - Derived metrics (%contribution, %study variation, number of distinct
//!   categories, %tolerance)
//! - Linearity and bias against reference values
//! - Shapiro-Wilk normality per operator and per part
//! - Descriptive statistics per stratum
//!
//! ## Quick Start
//!
//! ```rust
//! use gauge_rnr::GaugeStudyBuilder;
//! use gauge_rnr::grr::Component;
//!
//! let mut grr = GaugeStudyBuilder::new()
//!     .data(vec![
//!         vec![vec![3.29, 3.41, 3.64], vec![2.44, 2.32, 2.42], vec![4.34, 4.17, 4.27]],
//!         vec![vec![3.08, 3.25, 3.07], vec![2.53, 1.78, 2.32], vec![4.19, 3.94, 4.34]],
//!         vec![vec![3.04, 2.89, 2.85], vec![1.62, 1.87, 2.04], vec![3.88, 4.09, 3.67]],
//!     ])
//!     .interaction_threshold(0.25)
//!     .build()
//!     .unwrap();
//!
//! let result = grr.calculate();
//! assert_eq!(result.degrees_of_freedom[Component::Total], 26);
//! assert!(result.variance[Component::Part] > result.variance[Component::GaugeRnR]);
//!
//! println!("{}", grr.summary(3).unwrap());
//! ```
//!
//! ## Notation
//!
//! The study is a tensor `x[i, j, k]` with:
//! - **O**: number of operators (axis 0)
//! - **P**: number of parts (axis 1)
//! - **M**: number of repeated measurements per operator and part (axis 2)
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization of result types
//! - `parallel`: Enable batch analysis of many studies using rayon
//! - `python`: Enable Python bindings via PyO3
//!
//! ## Logging
//!
//! Pipeline stages and the pooling decision are reported through `tracing`
//! at debug level; degenerate designs produce a warning. Install any
//! subscriber to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod builder;
pub mod descriptive;
pub mod error;
pub mod grr;
pub mod linearity;
pub mod normality;
#[cfg(feature = "python")]
pub mod python;
pub mod stats;
pub mod summary;
pub mod tensor;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{gauge_study, GaugeStudyBuilder};
    pub use crate::descriptive::{Descriptive, DescriptiveResult, Moments};
    pub use crate::error::{Error, Result};
    pub use crate::grr::{
        analyze, Component, ComponentMap, GaugeRnR, GrrConfig, GrrResult, Means, Statistic,
    };
    pub use crate::linearity::{Linearity, LinearityResult};
    pub use crate::normality::{Normality, NormalityResult};
    pub use crate::stats::{f_survival, ordinary_least_squares, shapiro_wilk, LinearFit, ShapiroWilk};
    pub use crate::summary::Table;
    pub use crate::tensor::MeasurementTensor;

    #[cfg(feature = "parallel")]
    pub use crate::parallel::{par_analyze, par_grr_contribution};
}

// Re-export commonly used items at crate root
pub use builder::{gauge_study, GaugeStudyBuilder};
pub use descriptive::Descriptive;
pub use error::{Error, Result};
pub use grr::{analyze, GaugeRnR, GrrConfig, GrrResult};
pub use linearity::Linearity;
pub use normality::Normality;
pub use summary::Table;
pub use tensor::MeasurementTensor;

#[cfg(feature = "parallel")]
pub use parallel::{par_analyze, par_grr_contribution};
