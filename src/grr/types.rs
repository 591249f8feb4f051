//! Gauge R&R analysis types.
//!
//! Core types for the variance decomposition: the component and statistic
//! tags, a fixed-size per-component map, and the typed result bundle.

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};

/// A source of variation in the study.
///
/// The first five are the ANOVA sources; [`Component::GaugeRnR`] is the
/// composite of repeatability and reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Component {
    /// Between-operator variation (reproducibility).
    Operator,
    /// Part-to-part variation.
    Part,
    /// Operator × part interaction.
    OperatorByPart,
    /// Within-cell error (repeatability / equipment variation).
    Measurement,
    /// Total variation.
    Total,
    /// Measurement + operator (+ interaction when retained).
    GaugeRnR,
}

impl Component {
    /// The five ANOVA sources, in table order.
    pub const SOURCES: [Component; 5] = [
        Component::Operator,
        Component::Part,
        Component::OperatorByPart,
        Component::Measurement,
        Component::Total,
    ];

    /// Every component, in table order.
    pub const ALL: [Component; 6] = [
        Component::Operator,
        Component::Part,
        Component::OperatorByPart,
        Component::Measurement,
        Component::Total,
        Component::GaugeRnR,
    ];

    /// Human readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Operator => "Operator",
            Self::Part => "Part",
            Self::OperatorByPart => "Operator by Part",
            Self::Measurement => "Measurement",
            Self::Total => "Total",
            Self::GaugeRnR => "Gauge R&R",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Operator => 0,
            Self::Part => 1,
            Self::OperatorByPart => 2,
            Self::Measurement => 3,
            Self::Total => 4,
            Self::GaugeRnR => 5,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A statistic computed per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statistic {
    /// Degrees of freedom.
    DegreesOfFreedom,
    /// Mean (scalar for total, one value per level otherwise).
    Mean,
    /// Sum of squares.
    SumOfSquares,
    /// Mean square (SS / DF).
    MeanSquare,
    /// Variance component estimate.
    Variance,
    /// Standard deviation (square root of the variance component).
    StdDev,
    /// F ratio.
    F,
    /// Upper-tail p-value of the F ratio.
    P,
}

impl Statistic {
    /// Columns of the ANOVA summary table.
    pub const TABLE_COLUMNS: [Statistic; 7] = [
        Statistic::DegreesOfFreedom,
        Statistic::SumOfSquares,
        Statistic::MeanSquare,
        Statistic::Variance,
        Statistic::StdDev,
        Statistic::F,
        Statistic::P,
    ];

    /// Column header name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DegreesOfFreedom => "DF",
            Self::Mean => "Mean",
            Self::SumOfSquares => "SS",
            Self::MeanSquare => "MS",
            Self::Variance => "Var",
            Self::StdDev => "Std",
            Self::F => "F-value",
            Self::P => "P-value",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sparse, fixed-size map from [`Component`] to a value.
///
/// Not every statistic is defined for every component (there is no F ratio
/// for the total, for instance); missing entries are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentMap<T> {
    slots: [Option<T>; 6],
}

impl<T> Default for ComponentMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }
}

impl<T> ComponentMap<T> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a component, returning the previous one.
    pub fn insert(&mut self, component: Component, value: T) -> Option<T> {
        self.slots[component.slot()].replace(value)
    }

    /// Remove a component's value.
    pub fn remove(&mut self, component: Component) -> Option<T> {
        self.slots[component.slot()].take()
    }

    /// Value of a component, if defined.
    #[must_use]
    pub fn get(&self, component: Component) -> Option<&T> {
        self.slots[component.slot()].as_ref()
    }

    /// Whether the component has a value.
    #[must_use]
    pub fn contains(&self, component: Component) -> bool {
        self.get(component).is_some()
    }

    /// Defined entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Component, &T)> {
        Component::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|v| (c, v)))
    }

    /// Apply `f` to every defined entry.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ComponentMap<U> {
        let mut out = ComponentMap::new();
        for (c, v) in self.iter() {
            out.insert(c, f(v));
        }
        out
    }
}

impl<T> FromIterator<(Component, T)> for ComponentMap<T> {
    fn from_iter<I: IntoIterator<Item = (Component, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (c, v) in iter {
            map.insert(c, v);
        }
        map
    }
}

impl<T> Index<Component> for ComponentMap<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the component has no value.
    fn index(&self, component: Component) -> &T {
        self.get(component)
            .unwrap_or_else(|| panic!("no value for component {component}"))
    }
}

/// Means per stratum.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Means {
    /// Grand mean of every observation.
    pub total: f64,
    /// Mean per operator (over all parts and replicates).
    pub operator: Vec<f64>,
    /// Mean per part (over all operators and replicates).
    pub part: Vec<f64>,
    /// Mean per (operator, part) cell, operator-major.
    pub measurement: Vec<f64>,
}

impl Means {
    /// Means of a component as a slice (length 1 for the total).
    #[must_use]
    pub fn get(&self, component: Component) -> Option<&[f64]> {
        match component {
            Component::Total => Some(std::slice::from_ref(&self.total)),
            Component::Operator => Some(&self.operator),
            Component::Part => Some(&self.part),
            Component::Measurement => Some(&self.measurement),
            Component::OperatorByPart | Component::GaugeRnR => None,
        }
    }
}

/// Complete Gauge R&R result bundle.
///
/// One field per [`Statistic`]. Only produced once every stage of the
/// pipeline has run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrrResult {
    /// Degrees of freedom per ANOVA source.
    pub degrees_of_freedom: ComponentMap<usize>,
    /// Means per stratum.
    pub mean: Means,
    /// Sums of squares per ANOVA source.
    pub sum_of_squares: ComponentMap<f64>,
    /// Mean squares per ANOVA source.
    pub mean_square: ComponentMap<f64>,
    /// Clamped variance components, including the Gauge R&R composite.
    pub variance: ComponentMap<f64>,
    /// Square roots of the variance components.
    pub std_dev: ComponentMap<f64>,
    /// F ratios for operator, part and interaction.
    pub f_value: ComponentMap<f64>,
    /// P-values for operator, part and interaction.
    pub p_value: ComponentMap<f64>,
    /// Whether the interaction was pooled into the error term.
    pub interaction_pooled: bool,
}

impl GrrResult {
    /// Scalar value of a statistic for a component, if defined.
    ///
    /// Means are only scalar for [`Component::Total`].
    #[must_use]
    pub fn scalar(&self, statistic: Statistic, component: Component) -> Option<f64> {
        match statistic {
            Statistic::DegreesOfFreedom => self
                .degrees_of_freedom
                .get(component)
                .map(|&d| d as f64),
            Statistic::Mean => (component == Component::Total).then_some(self.mean.total),
            Statistic::SumOfSquares => self.sum_of_squares.get(component).copied(),
            Statistic::MeanSquare => self.mean_square.get(component).copied(),
            Statistic::Variance => self.variance.get(component).copied(),
            Statistic::StdDev => self.std_dev.get(component).copied(),
            Statistic::F => self.f_value.get(component).copied(),
            Statistic::P => self.p_value.get(component).copied(),
        }
    }

    /// Share of the total variance due to the measurement system.
    #[must_use]
    pub fn grr_contribution(&self) -> f64 {
        self.variance[Component::GaugeRnR] / self.variance[Component::Total]
    }

    /// Measurement system spread relative to total spread, `σ_GRR / σ_total`.
    #[must_use]
    pub fn study_variation(&self) -> f64 {
        self.grr_contribution().sqrt()
    }

    /// Number of distinct part categories the gauge can resolve.
    #[must_use]
    pub fn distinct_categories(&self) -> f64 {
        std::f64::consts::SQRT_2
            * (self.variance[Component::Part] / self.variance[Component::Measurement]).sqrt()
    }

    /// `6 σ_GRR / tolerance`, the share of a tolerance band consumed by the gauge.
    #[must_use]
    pub fn tolerance_ratio(&self, tolerance: f64) -> f64 {
        6.0 * self.std_dev[Component::GaugeRnR] / tolerance
    }
}

/// Configuration for a Gauge R&R calculation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrrConfig {
    /// The interaction is pooled into error when its p-value exceeds this
    /// (default: 1.0, never pool; 0.25 is the common choice).
    pub p_interaction_threshold: f64,
    /// Start with the interaction already pooled (default: false).
    pub pool_interaction: bool,
    /// Tolerance band width (USL - LSL) for tolerance ratios.
    pub tolerance: Option<f64>,
}

impl Default for GrrConfig {
    fn default() -> Self {
        Self {
            p_interaction_threshold: 1.0,
            pool_interaction: false,
            tolerance: None,
        }
    }
}

impl GrrConfig {
    /// Check that the configuration values are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is outside `[0, 1]` or the
    /// tolerance is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.p_interaction_threshold) {
            return Err(Error::invalid_params(format!(
                "interaction p-value threshold must be in [0, 1], got {}",
                self.p_interaction_threshold
            )));
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(Error::invalid_params(format!(
                    "tolerance must be positive, got {tolerance}"
                )));
            }
        }
        Ok(())
    }
}
