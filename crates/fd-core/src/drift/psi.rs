//! Population Stability Index.
//!
//! Bins come from the reference sample: the `n_bins + 1` evenly spaced
//! percentiles, with the outer edges opened to infinity and duplicates
//! collapsed. Both samples are then histogrammed on those edges and the
//! per-bin proportions clipped below at `eps` before taking
//! `Σ (c - r) ln(c / r)`.
//!
//! Rule of thumb: below 0.10 no shift, 0.10 to 0.20 moderate, 0.20 and
//! above significant.

use fd_common::{Error, Result};
use fd_math::{distinct_quantile_edges, sorted_copy, stable_sum, BinEdges};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default number of reference-quantile bins.
pub const DEFAULT_PSI_BINS: usize = 10;

/// Default proportion floor.
pub const DEFAULT_PSI_EPSILON: f64 = 1e-4;

/// PSI at or above this is a moderate shift.
pub const PSI_MODERATE: f64 = 0.10;

/// PSI at or above this is a significant shift.
pub const PSI_SIGNIFICANT: f64 = 0.20;

/// Alert level for a PSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PsiAlert {
    Low,
    Medium,
    High,
}

impl PsiAlert {
    /// Classify with the standard 0.10 / 0.20 cut-offs.
    pub fn from_psi(psi: f64) -> Self {
        Self::classify(psi, PSI_MODERATE, PSI_SIGNIFICANT)
    }

    /// Classify with explicit cut-offs. Both are inclusive lower bounds.
    pub fn classify(psi: f64, moderate: f64, significant: f64) -> Self {
        if psi >= significant {
            PsiAlert::High
        } else if psi >= moderate {
            PsiAlert::Medium
        } else {
            PsiAlert::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PsiAlert::Low => "LOW",
            PsiAlert::Medium => "MEDIUM",
            PsiAlert::High => "HIGH",
        }
    }
}

impl std::fmt::Display for PsiAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Reject an empty sample or one containing NaN or infinity.
pub(crate) fn check_sample(values: &[f64], what: &str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::empty(what));
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::invalid(format!(
            "{} contains a non-finite value at index {}",
            what, pos
        )));
    }
    Ok(())
}

/// Population Stability Index of `current` against `reference`.
///
/// Fails with `DegenerateDistribution` when the reference percentiles
/// collapse to a single value (for example a constant reference).
pub fn psi(reference: &[f64], current: &[f64], n_bins: usize, eps: f64) -> Result<f64> {
    check_psi_args(reference, current, n_bins, eps)?;
    let sorted_ref = sorted_copy(reference);
    let distinct = distinct_quantile_edges(&sorted_ref, n_bins);
    if distinct < 2 {
        return Err(Error::DegenerateDistribution {
            distinct_edges: distinct,
            requested_bins: n_bins,
        });
    }
    psi_over_quantile_bins(&sorted_ref, current, n_bins, eps)
}

/// PSI over whatever open quantile bins survive deduplication.
///
/// Never degenerate: a constant reference `c` gives the two bins
/// `(-inf, c)` and `[c, +inf)`, so identical constant samples score 0.
pub fn psi_open_bins(reference: &[f64], current: &[f64], n_bins: usize, eps: f64) -> Result<f64> {
    check_psi_args(reference, current, n_bins, eps)?;
    psi_over_quantile_bins(&sorted_copy(reference), current, n_bins, eps)
}

fn check_psi_args(reference: &[f64], current: &[f64], n_bins: usize, eps: f64) -> Result<()> {
    if n_bins == 0 {
        return Err(Error::invalid("n_bins must be at least 1"));
    }
    if !(eps > 0.0 && eps.is_finite()) {
        return Err(Error::invalid(format!("eps must be positive, got {}", eps)));
    }
    check_sample(reference, "reference")?;
    check_sample(current, "current")
}

fn psi_over_quantile_bins(
    sorted_ref: &[f64],
    current: &[f64],
    n_bins: usize,
    eps: f64,
) -> Result<f64> {
    let edges = BinEdges::from_reference_quantiles(sorted_ref, n_bins)
        .ok_or_else(|| Error::invalid("could not build bin edges from the reference"))?;

    let ref_props = edges.proportions(sorted_ref);
    let cur_props = edges.proportions(current);

    let terms: Vec<f64> = ref_props
        .iter()
        .zip(&cur_props)
        .map(|(&r, &c)| {
            let r = r.max(eps);
            let c = c.max(eps);
            (c - r) * (c / r).ln()
        })
        .collect();
    Ok(stable_sum(&terms))
}
