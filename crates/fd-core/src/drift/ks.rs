//! Two-sample Kolmogorov–Smirnov drift test.

use super::psi::check_sample;
use fd_common::{Error, Result};
use fd_math::{ks_p_value, ks_statistic, sorted_copy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default significance level.
pub const DEFAULT_KS_THRESHOLD: f64 = 0.05;

/// Outcome of a KS drift test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KsResult {
    /// `sup |F_ref - F_cur|`.
    pub statistic: f64,
    /// Asymptotic two-sided p-value.
    pub p_value: f64,
    /// `p_value < threshold`.
    pub is_drift: bool,
}

/// Test whether `current` is drawn from the same distribution as `reference`.
pub fn ks_drift_test(reference: &[f64], current: &[f64], threshold: f64) -> Result<KsResult> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::invalid(format!(
            "KS threshold must be in [0, 1], got {}",
            threshold
        )));
    }
    check_sample(reference, "reference")?;
    check_sample(current, "current")?;

    let a = sorted_copy(reference);
    let b = sorted_copy(current);
    let statistic = ks_statistic(&a, &b);
    let p_value = ks_p_value(statistic, a.len(), b.len());
    Ok(KsResult {
        statistic,
        p_value,
        is_drift: p_value < threshold,
    })
}
