//! Two-sample Kolmogorov–Smirnov statistic and the Kolmogorov distribution.
//!
//! The p-value uses the asymptotic Kolmogorov distribution evaluated at
//! Stephens' corrected argument `(en + 0.12 + 0.11 / en) * D` with
//! `en = sqrt(n1 * n2 / (n1 + n2))` (Numerical Recipes, §14.3).

use std::f64::consts::PI;

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;
const SERIES_SWITCH: f64 = 1.18;

/// Survival function of the Kolmogorov distribution, `P(K > z)`.
///
/// Uses the theta-function series for small `z` and the alternating
/// series for large `z`; both converge to double precision in four terms.
pub fn kolmogorov_sf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z <= 0.0 {
        return 1.0;
    }
    let sf = if z < SERIES_SWITCH {
        let y = (-PI * PI / (8.0 * z * z)).exp();
        let y8 = y.powi(8);
        // y^1 + y^9 + y^25 + y^49
        let series = y * (1.0 + y8 * (1.0 + y8 * y8 * (1.0 + y8 * y8 * y8)));
        1.0 - SQRT_2PI / z * series
    } else {
        let x = (-2.0 * z * z).exp();
        2.0 * (x - x.powi(4) + x.powi(9) - x.powi(16))
    };
    sf.clamp(0.0, 1.0)
}

/// Two-sample KS statistic `D = sup |F_a(x) - F_b(x)|` for sorted samples.
///
/// Both empirical CDFs are right-continuous and evaluated at every pooled
/// value, so ties across samples are handled exactly. Returns NaN if either
/// sample is empty.
pub fn ks_statistic(sorted_a: &[f64], sorted_b: &[f64]) -> f64 {
    let (n1, n2) = (sorted_a.len(), sorted_b.len());
    if n1 == 0 || n2 == 0 {
        return f64::NAN;
    }
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0f64;
    while i < n1 && j < n2 {
        let x = sorted_a[i].min(sorted_b[j]);
        while i < n1 && sorted_a[i] <= x {
            i += 1;
        }
        while j < n2 && sorted_b[j] <= x {
            j += 1;
        }
        let diff = (i as f64 / n1f - j as f64 / n2f).abs();
        if diff > d {
            d = diff;
        }
    }
    d
}

/// Asymptotic two-sided p-value for statistic `d` with sample sizes `n1`, `n2`.
pub fn ks_p_value(d: f64, n1: usize, n2: usize) -> f64 {
    if d.is_nan() || n1 == 0 || n2 == 0 {
        return f64::NAN;
    }
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let en = (n1f * n2f / (n1f + n2f)).sqrt();
    kolmogorov_sf((en + 0.12 + 0.11 / en) * d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn sf_known_values() {
        // Reference values of the Kolmogorov distribution.
        assert!(approx_eq(kolmogorov_sf(0.5), 0.963_945_243_1, 1e-8));
        assert!(approx_eq(kolmogorov_sf(1.0), 0.269_999_671_8, 1e-8));
        assert!(approx_eq(kolmogorov_sf(1.358_098_8), 0.05, 1e-6));
        assert!(approx_eq(kolmogorov_sf(2.0), 0.000_670_925_3, 1e-9));
    }

    #[test]
    fn sf_is_continuous_at_series_switch() {
        let below = kolmogorov_sf(SERIES_SWITCH - 1e-9);
        let above = kolmogorov_sf(SERIES_SWITCH);
        assert!(approx_eq(below, above, 1e-8));
    }

    #[test]
    fn sf_limits() {
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        assert_eq!(kolmogorov_sf(-1.0), 1.0);
        assert!(approx_eq(kolmogorov_sf(0.01), 1.0, 1e-12));
        assert!(kolmogorov_sf(10.0) < 1e-40);
        assert!(kolmogorov_sf(f64::NAN).is_nan());
    }

    #[test]
    fn statistic_identical_samples_is_zero() {
        let a = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(ks_statistic(&a, &a), 0.0);
    }

    #[test]
    fn statistic_disjoint_samples_is_one() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 11.0];
        assert_eq!(ks_statistic(&a, &b), 1.0);
        assert_eq!(ks_statistic(&b, &a), 1.0);
    }

    #[test]
    fn statistic_handles_cross_sample_ties() {
        // F_a jumps to 0.5 at 1 and to 1.0 at 2; F_b jumps to 1.0 at 1.
        let a = [1.0, 2.0];
        let b = [1.0, 1.0];
        assert!(approx_eq(ks_statistic(&a, &b), 0.5, 1e-15));
    }

    #[test]
    fn statistic_empty_is_nan() {
        assert!(ks_statistic(&[], &[1.0]).is_nan());
        assert!(ks_p_value(0.1, 0, 5).is_nan());
    }

    #[test]
    fn p_value_of_zero_statistic_is_one() {
        assert_eq!(ks_p_value(0.0, 100, 100), 1.0);
    }

    #[test]
    fn p_value_shrinks_with_sample_size() {
        let small = ks_p_value(0.2, 20, 20);
        let large = ks_p_value(0.2, 2000, 2000);
        assert!(small > large);
        assert!(large < 1e-10);
    }
}
