//! Statistical primitives used by the analyses.
//!
//! Provides:
//! - F-distribution upper-tail probability (ANOVA p-values)
//! - Two-sided Student's t probability
//! - Simple ordinary least squares with intercept
//! - Shapiro-Wilk W test (Royston 1995 approximation)
//!
//! The distributions themselves come from `statrs`; this module fixes how
//! degenerate inputs behave. Undefined statistics (zero degrees of freedom,
//! NaN ratios) are reported as NaN rather than errors.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use tracing::warn;

use crate::error::{Error, Result};

/// Largest sample the Royston approximation is calibrated for.
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

/// Upper-tail probability `P(F > f)` of the F-distribution.
///
/// Returns NaN when either degrees of freedom is zero or `f` is NaN, so that
/// a degenerate design shows up in the result instead of being masked.
///
/// # Arguments
/// * `f` - F statistic value
/// * `df1` - Numerator degrees of freedom
/// * `df2` - Denominator degrees of freedom
#[must_use]
pub fn f_survival(f: f64, df1: usize, df2: usize) -> f64 {
    if f.is_nan() || df1 == 0 || df2 == 0 {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }

    FisherSnedecor::new(df1 as f64, df2 as f64).map_or(f64::NAN, |dist| dist.sf(f))
}

/// Two-sided p-value `P(|T| > |t|)` of Student's t with `df` degrees of freedom.
#[must_use]
pub fn t_two_sided(t: f64, df: usize) -> f64 {
    if t.is_nan() || df == 0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }

    StudentsT::new(0.0, 1.0, df as f64).map_or(f64::NAN, |dist| (2.0 * dist.sf(t.abs())).min(1.0))
}

/// Result of a straight-line least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Standard error of the slope.
    pub slope_std_error: f64,
    /// Standard error of the intercept.
    pub intercept_std_error: f64,
    /// Two-sided p-value for `slope == 0`.
    pub slope_p_value: f64,
    /// Two-sided p-value for `intercept == 0`.
    pub intercept_p_value: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Residual degrees of freedom (n - 2).
    pub residual_df: usize,
}

/// Ordinary least squares of `y` on `x` with an intercept term.
///
/// # Errors
///
/// * `DimensionMismatch` if `x` and `y` differ in length
/// * `InsufficientData` with fewer than three points
/// * `DegenerateSample` if every `x` is identical
///
/// # Example
///
/// ```
/// use gauge_rnr::stats::ordinary_least_squares;
///
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
/// let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let fit = ordinary_least_squares(&x, &y).unwrap();
///
/// assert!((fit.slope - 1.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
pub fn ordinary_least_squares(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(Error::dimension_mismatch(
            format!("{} responses", x.len()),
            format!("{} responses", y.len()),
        ));
    }
    let n = x.len();
    if n < 3 {
        return Err(Error::InsufficientData {
            test: "least squares",
            required: 3,
            actual: n,
        });
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx <= 0.0 {
        return Err(Error::degenerate_sample(
            "regressor has zero spread; the slope is undefined",
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();
    let residual_df = n - 2;
    let sigma2 = sse / residual_df as f64;

    let slope_std_error = (sigma2 / sxx).sqrt();
    let intercept_std_error = (sigma2 * (1.0 / nf + x_mean * x_mean / sxx)).sqrt();

    let r_squared = if syy > 0.0 { 1.0 - sse / syy } else { f64::NAN };

    Ok(LinearFit {
        slope,
        intercept,
        slope_std_error,
        intercept_std_error,
        slope_p_value: t_two_sided(slope / slope_std_error, residual_df),
        intercept_p_value: t_two_sided(intercept / intercept_std_error, residual_df),
        r_squared,
        residual_df,
    })
}

/// Shapiro-Wilk test result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapiroWilk {
    /// W statistic in (0, 1]; values near 1 indicate normality.
    pub w: f64,
    /// Probability of a W this small under normality.
    pub p_value: f64,
}

// Royston (1995) polynomial coefficients.
const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.5440, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

/// `c[0] + c[1]*x + c[2]*x^2 + ...`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Shapiro-Wilk test for normality.
///
/// Uses Royston's approximation of the coefficients and of the W
/// distribution (algorithm AS R94). Samples above 5000 values are still
/// tested but a warning is logged since the p-value is extrapolated.
///
/// # Errors
///
/// * `InsufficientData` with fewer than three values
/// * `DegenerateSample` if a value is not finite or all values are equal
///
/// # Example
///
/// ```
/// use gauge_rnr::stats::shapiro_wilk;
///
/// let sw = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
/// assert!((sw.w - 1.0).abs() < 1e-12);
/// assert!((sw.p_value - 1.0).abs() < 1e-9);
/// ```
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroWilk> {
    let n = sample.len();
    if n < 3 {
        return Err(Error::InsufficientData {
            test: "Shapiro-Wilk",
            required: 3,
            actual: n,
        });
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(Error::degenerate_sample("sample contains non-finite values"));
    }
    if n > SHAPIRO_WILK_MAX_N {
        warn!(n, "Shapiro-Wilk p-value may be inaccurate above 5000 observations");
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if range <= f64::EPSILON * x[0].abs().max(1.0) {
        return Err(Error::degenerate_sample("all values are identical"));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| Error::degenerate_sample(format!("standard normal: {e}")))?;
    let a = shapiro_wilk_coefficients(n, &normal);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ss).min(1.0);

    Ok(ShapiroWilk {
        w,
        p_value: shapiro_wilk_p_value(w, n, &normal),
    })
}

/// Antisymmetric coefficients `a_1 .. a_{n/2}` (largest first).
fn shapiro_wilk_coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let half = n / 2;
    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    a[0] = a1;

    let (first_scaled, fac) = if n > 5 {
        let a2 = poly(&C2, rsn) - m[1] / ssumm2;
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn shapiro_wilk_p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }

    if n == 3 {
        // Exact distribution for three observations.
        let p = (6.0 / PI) * (w.sqrt().asin() - PI / 3.0);
        return p.clamp(0.0, 1.0);
    }

    let an = n as f64;
    let y = (1.0 - w).ln();
    let (y, mean, sd) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        (-(gamma - y).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal.sf((y - mean) / sd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f_survival_bounds() {
        // P(F > 0) should be 1
        assert!((f_survival(0.0, 3, 10) - 1.0).abs() < 1e-12);

        // Very large F should give very small p-value
        assert!(f_survival(100.0, 3, 10) < 0.001);
        assert_eq!(f_survival(f64::INFINITY, 2, 8), 0.0);
    }

    #[test]
    fn test_f_survival_known_values() {
        // F(3, 10) critical value at alpha = 0.05 is 3.708
        assert!((f_survival(3.708, 3, 10) - 0.05).abs() < 1e-3);

        // Interaction test of the reference study
        assert!((f_survival(0.142_376, 8, 30) - 0.9964).abs() < 1e-4);

        let p_low = f_survival(2.0, 3, 10);
        let p_high = f_survival(6.0, 3, 10);
        assert!(p_low > p_high, "p should decrease as F increases");
    }

    #[test]
    fn test_f_survival_degenerate() {
        assert!(f_survival(1.0, 0, 10).is_nan());
        assert!(f_survival(1.0, 2, 0).is_nan());
        assert!(f_survival(f64::NAN, 2, 8).is_nan());
    }

    #[test]
    fn test_t_two_sided() {
        assert!((t_two_sided(0.0, 8) - 1.0).abs() < 1e-12);
        // t(10) two-sided 95% critical value is 2.228
        assert!((t_two_sided(2.228, 10) - 0.05).abs() < 1e-3);
        assert!((t_two_sided(-2.228, 10) - 0.05).abs() < 1e-3);
        assert!(t_two_sided(1.0, 0).is_nan());
    }

    #[test]
    fn test_ols_known_fit() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y = [1.0, 3.0, 2.0, 5.0, 7.0, 8.0, 8.0, 9.0, 10.0, 12.0];
        let fit = ordinary_least_squares(&x, &y).unwrap();

        assert!((fit.slope - 1.169_70).abs() < 1e-4);
        assert!((fit.intercept - 1.236_36).abs() < 1e-4);
        assert_eq!(fit.residual_df, 8);
        assert!(fit.slope_p_value < 0.001);
        // t = 2.51 on 8 df
        assert!(fit.intercept_p_value > 0.02 && fit.intercept_p_value < 0.05);
        assert!(fit.r_squared > 0.9);
    }

    #[test]
    fn test_ols_offset_line() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = (1..=10).map(f64::from).collect();
        let fit = ordinary_least_squares(&x, &y).unwrap();

        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(fit.slope_std_error < 1e-6);
    }

    #[test]
    fn test_ols_errors() {
        assert!(matches!(
            ordinary_least_squares(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ordinary_least_squares(&[1.0, 2.0], &[1.0, 2.0]),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            ordinary_least_squares(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(Error::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_shapiro_wilk_skewed_sample() {
        let sample = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let sw = shapiro_wilk(&sample).unwrap();
        assert!((sw.w - 0.7888).abs() < 1e-3, "W = {}", sw.w);
        assert!((sw.p_value - 0.0067).abs() < 1e-3, "p = {}", sw.p_value);
    }

    #[test]
    fn test_shapiro_wilk_small_samples() {
        let sw = shapiro_wilk(&[1.0, 2.0, 4.0, 8.0]).unwrap();
        assert!((sw.w - 0.9202).abs() < 1e-3);
        assert!((sw.p_value - 0.538).abs() < 1e-2);

        let sw = shapiro_wilk(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!((sw.w - 0.9868).abs() < 1e-3);
        assert!(sw.p_value > 0.9);
    }

    #[test]
    fn test_shapiro_wilk_outlier_rejects_normality() {
        let mut sample = vec![1.0; 11];
        sample[3] = 1.1;
        sample.push(50.0);
        let sw = shapiro_wilk(&sample).unwrap();
        assert!(sw.p_value < 0.001);
        assert!(sw.w < 0.5);
    }

    #[test]
    fn test_shapiro_wilk_errors() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(Error::InsufficientData { actual: 2, .. })
        ));
        assert!(matches!(
            shapiro_wilk(&[4.0, 4.0, 4.0, 4.0]),
            Err(Error::DegenerateSample { .. })
        ));
        assert!(matches!(
            shapiro_wilk(&[1.0, f64::NAN, 3.0]),
            Err(Error::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_poly() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(poly(&G, 0.0), -2.273);
    }
}
