//! Numerically stable primitives for probability and moment computations.

/// Default clipping bound for probabilities fed into a logarithm.
pub const LOG_LOSS_EPS: f64 = 1e-15;

/// Compensated (Neumaier) summation.
///
/// Returns 0.0 for empty input and NaN if any value is NaN.
pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Arithmetic mean using compensated summation.
///
/// Returns NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    stable_sum(values) / values.len() as f64
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 1` gives the unbiased sample estimator. Returns NaN when
/// `values.len() <= ddof`.
pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    let squares: Vec<f64> = values.iter().map(|v| (v - m) * (v - m)).collect();
    (stable_sum(&squares) / (n - ddof) as f64).sqrt()
}

/// Clip a probability into `[eps, 1 - eps]`.
pub fn clip_probability(p: f64, eps: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    p.clamp(eps, 1.0 - eps)
}

/// Binary cross-entropy of a single prediction.
///
/// `p` is clipped to `[eps, 1 - eps]` so the loss is always finite.
pub fn binary_log_loss(label: bool, p: f64, eps: f64) -> f64 {
    let p = clip_probability(p, eps);
    if label {
        -p.ln()
    } else {
        -(-p).ln_1p()
    }
}

/// Round to `decimals` places the way Python's `round(x, n)` does.
///
/// The exact binary value is rounded, not a scaled copy: `2.675` is stored
/// just below itself and rounds to `2.67`, and exact ties such as `2.5` go
/// to the even digit. Negative `decimals` scale by a power of ten and round
/// half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match usize::try_from(decimals) {
        // Fixed-precision formatting is correctly rounded, ties to even.
        Ok(places) => format!("{:.*}", places, value).parse().unwrap_or(value),
        Err(_) => {
            let scale = 10f64.powi(decimals);
            (value * scale).round() / scale
        }
    }
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
    fn stable_sum_recovers_cancelled_terms() {
        let v = [1e16, 1.0, -1e16];
        assert_eq!(stable_sum(&v), 1.0);
        assert_eq!(v.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn stable_sum_empty_is_zero() {
        assert_eq!(stable_sum(&[]), 0.0);
    }

    #[test]
    fn mean_basic_and_empty() {
        assert!(approx_eq(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5, 1e-15));
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn std_dev_sample_vs_population() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(std_dev(&v, 0), 2.0, 1e-12));
        assert!(approx_eq(std_dev(&v, 1), (32.0f64 / 7.0).sqrt(), 1e-12));
        assert!(std_dev(&[1.0], 1).is_nan());
    }

    #[test]
    fn clip_probability_bounds() {
        assert_eq!(clip_probability(0.0, 1e-15), 1e-15);
        assert_eq!(clip_probability(1.0, 1e-15), 1.0 - 1e-15);
        assert_eq!(clip_probability(0.3, 1e-15), 0.3);
        assert!(clip_probability(f64::NAN, 1e-15).is_nan());
    }

    #[test]
    fn binary_log_loss_is_finite_at_extremes() {
        let worst = binary_log_loss(true, 0.0, LOG_LOSS_EPS);
        assert!(worst.is_finite());
        assert!(approx_eq(worst, -(1e-15f64).ln(), 1e-9));

        let best = binary_log_loss(false, 0.0, LOG_LOSS_EPS);
        assert!(best >= 0.0 && best < 1e-12);
    }

    #[test]
    fn binary_log_loss_symmetry() {
        let a = binary_log_loss(true, 0.3, LOG_LOSS_EPS);
        let b = binary_log_loss(false, 0.7, LOG_LOSS_EPS);
        assert!(approx_eq(a, b, 1e-12));
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-12.345, 1), -12.3);
        assert_eq!(round_to(1234.5, -2), 1200.0);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn round_to_uses_the_stored_binary_value() {
        // 2.675 is stored as 2.67499999...; 1.0005 as 1.000499999...
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(1.0005, 3), 1.0);
        // Exact ties go to the even digit.
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-0.5, 0), 0.0);
    }
}
