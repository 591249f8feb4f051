//! Batch analysis of independent studies using Rayon.
//!
//! Enable with the `parallel` feature flag. Every study gets its own engine
//! on a worker thread; nothing is shared between them, so the results are
//! identical to running the studies one after another.
//!
//! # Usage
//!
//! ```ignore
//! use gauge_rnr::parallel::par_analyze;
//! use gauge_rnr::grr::GrrConfig;
//!
//! let results = par_analyze(&studies, &GrrConfig::default())?;
//! assert_eq!(results.len(), studies.len());
//! ```
//!
//! # Performance
//!
//! A single study is cheap, so parallelism pays off for large batches, for
//! example simulated studies or one study per gauge in a plant.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::grr::{GaugeRnR, GrrConfig, GrrResult};
use crate::tensor::MeasurementTensor;

/// Run the Gauge R&R ANOVA on every study in parallel.
///
/// Results are returned in input order.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn par_analyze(studies: &[MeasurementTensor], config: &GrrConfig) -> Result<Vec<GrrResult>> {
    config.validate()?;
    debug!(studies = studies.len(), "analyzing studies in parallel");

    studies
        .par_iter()
        .map(|tensor| {
            let mut grr = GaugeRnR::with_config(tensor.clone(), config.clone())?;
            Ok(grr.calculate().clone())
        })
        .collect()
}

/// Gauge R&R contribution (`σ²_GRR / σ²_total`) of every study in parallel.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn par_grr_contribution(studies: &[MeasurementTensor], config: &GrrConfig) -> Result<Vec<f64>> {
    Ok(par_analyze(studies, config)?
        .iter()
        .map(GrrResult::grr_contribution)
        .collect())
}
