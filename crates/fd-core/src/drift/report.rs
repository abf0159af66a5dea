//! Multi-feature drift report.

use super::ks::{ks_drift_test, DEFAULT_KS_THRESHOLD};
use super::psi::{
    psi, psi_open_bins, PsiAlert, DEFAULT_PSI_BINS, DEFAULT_PSI_EPSILON, PSI_MODERATE,
    PSI_SIGNIFICANT,
};
use crate::table::Frame;
use chrono::{DateTime, Utc};
use fd_common::{Error, Result, SCHEMA_VERSION};
use fd_config::{ConfigSnapshot, DriftConfig};
use fd_math::{mean, round_to};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Parameters for [`drift_report_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftOptions {
    pub n_bins: usize,
    pub psi_epsilon: f64,
    pub ks_threshold: f64,
    pub psi_moderate: f64,
    pub psi_significant: f64,
}

impl Default for DriftOptions {
    fn default() -> Self {
        Self {
            n_bins: DEFAULT_PSI_BINS,
            psi_epsilon: DEFAULT_PSI_EPSILON,
            ks_threshold: DEFAULT_KS_THRESHOLD,
            psi_moderate: PSI_MODERATE,
            psi_significant: PSI_SIGNIFICANT,
        }
    }
}

impl From<&DriftConfig> for DriftOptions {
    fn from(cfg: &DriftConfig) -> Self {
        Self {
            n_bins: cfg.psi_bins,
            psi_epsilon: cfg.psi_epsilon,
            ks_threshold: cfg.ks_threshold,
            psi_moderate: cfg.psi_moderate,
            psi_significant: cfg.psi_significant,
        }
    }
}

/// Drift statistics for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DriftRow {
    pub feature: String,
    /// Rounded to 4 decimals.
    pub psi: f64,
    /// Computed from the unrounded PSI.
    pub psi_alert: PsiAlert,
    /// Rounded to 4 decimals.
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub ks_drift: bool,
    pub ref_mean: f64,
    pub cur_mean: f64,
    /// Relative change of the mean in percent, rounded to 2 decimals.
    pub mean_shift_pct: f64,
}

impl DriftRow {
    /// HIGH alert or a significant KS test.
    pub fn is_drifted(&self) -> bool {
        self.psi_alert == PsiAlert::High || self.ks_drift
    }
}

/// Drift rows for a set of features, sorted by PSI descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DriftReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub n_bins: usize,
    /// Rows in the reference frame.
    pub n_reference: usize,
    /// Rows in the current frame.
    pub n_current: usize,
    pub rows: Vec<DriftRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSnapshot>,
}

impl DriftReport {
    /// Features with a HIGH PSI alert or a KS drift flag, in report order.
    pub fn drifted_features(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.is_drifted())
            .map(|r| r.feature.as_str())
            .collect()
    }

    pub fn has_drift(&self) -> bool {
        self.rows.iter().any(DriftRow::is_drifted)
    }

    pub fn row(&self, feature: &str) -> Option<&DriftRow> {
        self.rows.iter().find(|r| r.feature == feature)
    }

    pub fn with_config(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config = Some(snapshot);
        self
    }

    /// Fixed-width table for terminal display.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<24} {:>9} {:>7} {:>9} {:>11} {:>6} {:>12} {:>12} {:>10}\n",
            "feature", "psi", "alert", "ks_stat", "ks_p", "drift", "ref_mean", "cur_mean", "shift_%"
        ));
        out.push_str(&"─".repeat(108));
        out.push('\n');
        for r in &self.rows {
            out.push_str(&format!(
                "{:<24} {:>9.4} {:>7} {:>9.4} {:>11.3e} {:>6} {:>12.4} {:>12.4} {:>10.2}\n",
                r.feature,
                r.psi,
                r.psi_alert,
                r.ks_statistic,
                r.ks_p_value,
                if r.ks_drift { "yes" } else { "no" },
                r.ref_mean,
                r.cur_mean,
                r.mean_shift_pct
            ));
        }
        out
    }
}

/// Numeric columns present in both frames, in reference order.
pub fn shared_numeric_features(reference: &Frame, current: &Frame) -> Vec<String> {
    let current_numeric = current.numeric_column_names();
    reference
        .numeric_column_names()
        .into_iter()
        .filter(|name| current_numeric.contains(name))
        .collect()
}

/// Drift report with default PSI epsilon, KS threshold and alert cut-offs.
pub fn drift_report<S: AsRef<str>>(
    reference: &Frame,
    current: &Frame,
    features: &[S],
    n_bins: usize,
) -> Result<DriftReport> {
    let options = DriftOptions {
        n_bins,
        ..DriftOptions::default()
    };
    drift_report_with(reference, current, features, &options)
}

/// One row per feature, sorted by rounded PSI descending. Ties keep the
/// order of `features`.
///
/// Missing cells are dropped independently in each frame. A feature whose
/// reference percentiles collapse to one value (a constant column) still
/// gets a row, scored on the open bins either side of that value. Errors
/// name the feature they were raised for.
pub fn drift_report_with<S: AsRef<str>>(
    reference: &Frame,
    current: &Frame,
    features: &[S],
    options: &DriftOptions,
) -> Result<DriftReport> {
    let mut rows = Vec::with_capacity(features.len());
    for feat in features {
        let feat = feat.as_ref();
        let row = feature_row(reference, current, feat, options).map_err(|e| e.for_feature(feat))?;
        debug!(
            feature = feat,
            psi = row.psi,
            alert = %row.psi_alert,
            ks_p_value = row.ks_p_value,
            "drift computed"
        );
        rows.push(row);
    }
    rows.sort_by(|a, b| b.psi.total_cmp(&a.psi));

    Ok(DriftReport {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        n_bins: options.n_bins,
        n_reference: reference.n_rows(),
        n_current: current.n_rows(),
        rows,
        config: None,
    })
}

fn feature_row(
    reference: &Frame,
    current: &Frame,
    feature: &str,
    options: &DriftOptions,
) -> Result<DriftRow> {
    let ref_values = reference.numeric_values(feature)?;
    let cur_values = current.numeric_values(feature)?;
    if ref_values.is_empty() {
        return Err(Error::empty("reference column (all values missing)"));
    }
    if cur_values.is_empty() {
        return Err(Error::empty("current column (all values missing)"));
    }

    let psi_value = match psi(&ref_values, &cur_values, options.n_bins, options.psi_epsilon) {
        Err(Error::DegenerateDistribution { distinct_edges, .. }) => {
            warn!(
                feature,
                distinct_edges,
                "reference percentiles collapse; scoring PSI on open bins split at the reference value"
            );
            psi_open_bins(&ref_values, &cur_values, options.n_bins, options.psi_epsilon)?
        }
        other => other?,
    };
    let ks = ks_drift_test(&ref_values, &cur_values, options.ks_threshold)?;
    let ref_mean = mean(&ref_values);
    let cur_mean = mean(&cur_values);

    Ok(DriftRow {
        feature: feature.to_string(),
        psi: round_to(psi_value, 4),
        psi_alert: PsiAlert::classify(psi_value, options.psi_moderate, options.psi_significant),
        ks_statistic: round_to(ks.statistic, 4),
        ks_p_value: ks.p_value,
        ks_drift: ks.is_drift,
        ref_mean: round_to(ref_mean, 4),
        cur_mean: round_to(cur_mean, 4),
        mean_shift_pct: round_to((cur_mean - ref_mean) / (ref_mean.abs() + 1e-10) * 100.0, 2),
    })
}
