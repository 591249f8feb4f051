//! Python bindings for gauge-rnr.
//!
//! This module exposes the analyses to Python using PyO3. Enable the
//! `python` feature to use this.

use std::collections::HashMap;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::Error;
use crate::grr::{Component, GaugeRnR, GrrConfig};
use crate::linearity::Linearity;
use crate::normality::Normality;
use crate::tensor::MeasurementTensor;

fn to_py_err(e: Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn component_from_name(name: &str) -> PyResult<Component> {
    Component::ALL
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| PyValueError::new_err(format!("unknown component '{name}'")))
}

/// Python wrapper for the Gauge R&R engine.
#[pyclass(name = "GaugeRnR")]
pub struct PyGaugeRnR {
    inner: GaugeRnR,
}

#[pymethods]
impl PyGaugeRnR {
    /// Create a study from data nested as `[operator][part][measurement]`.
    #[new]
    #[pyo3(signature = (data, p_interaction_threshold=1.0, tolerance=None))]
    fn new(
        data: Vec<Vec<Vec<f64>>>,
        p_interaction_threshold: f64,
        tolerance: Option<f64>,
    ) -> PyResult<Self> {
        let tensor = MeasurementTensor::from_nested(&data).map_err(to_py_err)?;
        let config = GrrConfig {
            p_interaction_threshold,
            tolerance,
            ..Default::default()
        };
        let inner = GaugeRnR::with_config(tensor, config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Run the ANOVA.
    fn calculate(&mut self) {
        self.inner.calculate();
    }

    /// Whether the interaction was pooled into the error term.
    #[getter]
    fn interaction_pooled(&self) -> bool {
        self.inner.interaction_pooled()
    }

    /// Variance components keyed by component name.
    fn variance(&self) -> PyResult<HashMap<String, f64>> {
        let result = self.inner.result().map_err(to_py_err)?;
        Ok(result
            .variance
            .iter()
            .map(|(c, &v)| (c.name().to_string(), v))
            .collect())
    }

    /// P-value of one component's F test.
    fn p_value(&self, component: &str) -> PyResult<Option<f64>> {
        let component = component_from_name(component)?;
        let result = self.inner.result().map_err(to_py_err)?;
        Ok(result.p_value.get(component).copied())
    }

    /// `σ²_GRR / σ²_total`.
    fn grr_contribution(&self) -> PyResult<f64> {
        self.inner.grr_contribution().map_err(to_py_err)
    }

    /// `σ_GRR / σ_total`.
    fn study_variation(&self) -> PyResult<f64> {
        self.inner.study_variation().map_err(to_py_err)
    }

    /// Number of distinct categories.
    fn distinct_categories(&self) -> PyResult<f64> {
        self.inner.distinct_categories().map_err(to_py_err)
    }

    /// ANOVA table as text.
    #[pyo3(signature = (precision=3))]
    fn summary(&self, precision: usize) -> PyResult<String> {
        Ok(self.inner.summary(precision).map_err(to_py_err)?.to_string())
    }
}

/// Python wrapper for the linearity analysis.
#[pyclass(name = "Linearity")]
pub struct PyLinearity {
    inner: Linearity,
}

#[pymethods]
impl PyLinearity {
    /// Create the analysis, optionally with one reference value per part.
    #[new]
    #[pyo3(signature = (data, references=None))]
    fn new(data: Vec<Vec<Vec<f64>>>, references: Option<Vec<f64>>) -> PyResult<Self> {
        let tensor = MeasurementTensor::from_nested(&data).map_err(to_py_err)?;
        let inner = Linearity::new(tensor, references).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Fit and return `(linearity, bias, p_value)`.
    fn calculate(&mut self) -> PyResult<(f64, f64, f64)> {
        let result = self.inner.calculate().map_err(to_py_err)?;
        Ok((result.linearity, result.bias, result.p_value))
    }

    /// Fit table as text.
    #[pyo3(signature = (precision=3))]
    fn summary(&self, precision: usize) -> PyResult<String> {
        Ok(self.inner.summary(precision).map_err(to_py_err)?.to_string())
    }
}

/// Shapiro-Wilk normality per stratum.
#[pyfunction]
#[pyo3(signature = (data, precision=3))]
fn normality_summary(data: Vec<Vec<Vec<f64>>>, precision: usize) -> PyResult<String> {
    let tensor = MeasurementTensor::from_nested(&data).map_err(to_py_err)?;
    let mut normality = Normality::new(tensor);
    normality.calculate().map_err(to_py_err)?;
    Ok(normality.summary(precision).map_err(to_py_err)?.to_string())
}

/// The gauge_rnr Python module.
#[pymodule]
fn gauge_rnr(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyGaugeRnR>()?;
    m.add_class::<PyLinearity>()?;
    m.add_function(wrap_pyfunction!(normality_summary, m)?)?;
    Ok(())
}
