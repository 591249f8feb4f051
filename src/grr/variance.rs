//! Variance component estimates (expected mean squares).

use super::significance::denominator;
use super::types::{Component, ComponentMap};

/// Method-of-moments variance components.
///
/// Negative estimates are floored at zero before the total and Gauge R&R
/// composites are formed. While the interaction is retained it contributes
/// to both composites; once pooled it has no variance entry.
#[must_use]
pub fn variance_components(
    ms: &ComponentMap<f64>,
    shape: (usize, usize, usize),
    pooled: bool,
) -> ComponentMap<f64> {
    let (o, p, m) = shape;
    let den = ms[denominator(pooled)];
    let clamp = |v: f64| if v < 0.0 { 0.0 } else { v };

    let mut var = ComponentMap::new();
    var.insert(Component::Measurement, clamp(ms[Component::Measurement]));
    if !pooled {
        var.insert(
            Component::OperatorByPart,
            clamp((ms[Component::OperatorByPart] - ms[Component::Measurement]) / m as f64),
        );
    }
    var.insert(
        Component::Operator,
        clamp((ms[Component::Operator] - den) / (p * m) as f64),
    );
    var.insert(
        Component::Part,
        clamp((ms[Component::Part] - den) / (o * m) as f64),
    );

    let interaction = var.get(Component::OperatorByPart).copied().unwrap_or(0.0);
    let grr = var[Component::Measurement] + var[Component::Operator] + interaction;
    var.insert(Component::Total, grr + var[Component::Part]);
    var.insert(Component::GaugeRnR, grr);
    var
}

/// Elementwise square root.
#[must_use]
pub fn std_devs(var: &ComponentMap<f64>) -> ComponentMap<f64> {
    var.map(|v| v.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(operator: f64, part: f64, interaction: f64, measurement: f64) -> ComponentMap<f64> {
        [
            (Component::Operator, operator),
            (Component::Part, part),
            (Component::OperatorByPart, interaction),
            (Component::Measurement, measurement),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_unpooled_components() {
        let var = variance_components(&ms(10.0, 40.0, 4.0, 1.0), (2, 4, 3), false);

        assert_eq!(var[Component::Measurement], 1.0);
        assert_eq!(var[Component::OperatorByPart], 1.0); // (4 - 1) / 3
        assert_eq!(var[Component::Operator], 0.5); // (10 - 4) / 12
        assert_eq!(var[Component::Part], 6.0); // (40 - 4) / 6
        assert_eq!(var[Component::GaugeRnR], 2.5);
        assert_eq!(var[Component::Total], 8.5);
    }

    #[test]
    fn test_pooled_components() {
        let var = variance_components(&ms(10.0, 40.0, 4.0, 1.0), (2, 4, 3), true);

        assert!(!var.contains(Component::OperatorByPart));
        assert_eq!(var[Component::Operator], 0.75); // (10 - 1) / 12
        assert_eq!(var[Component::Part], 6.5); // (40 - 1) / 6
        assert_eq!(var[Component::GaugeRnR], 1.75);
        assert_eq!(var[Component::Total], 8.25);
    }

    #[test]
    fn test_negative_estimates_are_clamped() {
        // Interaction MS below error MS and operator MS below interaction MS
        let var = variance_components(&ms(0.5, 40.0, 0.8, 1.0), (2, 4, 3), false);

        assert_eq!(var[Component::OperatorByPart], 0.0);
        assert_eq!(var[Component::Operator], 0.0);
        assert_eq!(var[Component::GaugeRnR], 1.0);
        for (_, v) in var.iter() {
            assert!(*v >= 0.0);
        }
    }

    #[test]
    fn test_std_devs() {
        let var = variance_components(&ms(10.0, 40.0, 4.0, 1.0), (2, 4, 3), false);
        let std = std_devs(&var);
        assert_eq!(std[Component::Part], 6.0_f64.sqrt());
        assert_eq!(std[Component::Measurement], 1.0);
    }
}
