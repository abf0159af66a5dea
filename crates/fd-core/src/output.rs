//! Rendering of command payloads for stdout.
//!
//! Every payload renders in each [`OutputFormat`]:
//! - `json`: pretty JSON, the stable machine contract
//! - `md`: Markdown tables for notebooks and tickets
//! - `summary`: the fixed-width terminal report

use crate::calibrate::EvaluationReport;
use crate::drift::DriftReport;
use crate::table::{Column, Frame};
use fd_common::{OutputFormat, Result};
use serde::{Deserialize, Serialize};

/// Pretty JSON with a trailing newline.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

pub fn render_evaluation(report: &EvaluationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Summary => Ok(report.ascii_report(50, 12)),
        OutputFormat::Md => Ok(evaluation_markdown(report)),
    }
}

fn evaluation_markdown(report: &EvaluationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Evaluation: {}\n\n", report.model_name));
    out.push_str(&format!(
        "Threshold {} on {} samples ({} fraud, {} legitimate).\n\n",
        report.threshold, report.n_samples, report.n_positive, report.n_negative
    ));

    out.push_str("| Metric | Value |\n|---|---:|\n");
    for (name, value) in report.metrics.iter() {
        out.push_str(&format!("| {} | {:.6} |\n", name, value));
    }

    let cm = &report.confusion_matrix;
    out.push_str("\n## Confusion matrix\n\n");
    out.push_str("| | Pred Legitimate | Pred Fraud |\n|---|---:|---:|\n");
    out.push_str(&format!(
        "| Actual Legitimate | {} | {} |\n",
        cm.true_negatives, cm.false_positives
    ));
    out.push_str(&format!(
        "| Actual Fraud | {} | {} |\n",
        cm.false_negatives, cm.true_positives
    ));

    out.push_str("\n## Classification report\n\n");
    out.push_str("| Class | Precision | Recall | F1 | Support |\n|---|---:|---:|---:|---:|\n");
    for c in &report.classification.classes {
        out.push_str(&format!(
            "| {} | {:.4} | {:.4} | {:.4} | {} |\n",
            c.label, c.precision, c.recall, c.f1, c.support
        ));
    }

    out.push_str("\n## Calibration\n\n");
    out.push_str(&format!(
        "ECE {:.4}, MCE {:.4}.\n\n",
        report.calibration.ece, report.calibration.mce
    ));
    out.push_str("| Bin | Mean predicted | Actual rate | Count |\n|---|---:|---:|---:|\n");
    for bin in report.calibration.populated_bins() {
        out.push_str(&format!(
            "| ({:.2}, {:.2}] | {:.4} | {:.4} | {} |\n",
            bin.lower, bin.upper, bin.mean_predicted, bin.actual_rate, bin.count
        ));
    }

    if !report.hard_samples.is_empty() {
        out.push_str("\n## Hardest misclassifications\n\n");
        out.push_str("| Index | Kind | True | Probability | Loss |\n|---:|---|---:|---:|---:|\n");
        for s in &report.hard_samples {
            out.push_str(&format!(
                "| {} | {} | {} | {:.4} | {:.4} |\n",
                s.index,
                s.kind.short(),
                s.true_label,
                s.pred_prob,
                s.loss
            ));
        }
    }
    out
}

pub fn render_drift(report: &DriftReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Summary => Ok(drift_summary(report)),
        OutputFormat::Md => Ok(drift_markdown(report)),
    }
}

fn drift_summary(report: &DriftReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Drift report: {} feature(s), {} reference rows, {} current rows, {} bins\n\n",
        report.rows.len(),
        report.n_reference,
        report.n_current,
        report.n_bins
    ));
    out.push_str(&report.render_table());
    let drifted = report.drifted_features();
    out.push('\n');
    if drifted.is_empty() {
        out.push_str("No drift detected.\n");
    } else {
        out.push_str(&format!("Drift detected in: {}\n", drifted.join(", ")));
    }
    out
}

fn drift_markdown(report: &DriftReport) -> String {
    let mut out = String::from("# Drift report\n\n");
    out.push_str(
        "| Feature | PSI | Alert | KS statistic | KS p-value | KS drift | Ref mean | Cur mean | Shift % |\n",
    );
    out.push_str("|---|---:|---|---:|---:|---|---:|---:|---:|\n");
    for r in &report.rows {
        out.push_str(&format!(
            "| {} | {:.4} | {} | {:.4} | {:.3e} | {} | {:.4} | {:.4} | {:.2} |\n",
            r.feature,
            r.psi,
            r.psi_alert,
            r.ks_statistic,
            r.ks_p_value,
            r.ks_drift,
            r.ref_mean,
            r.cur_mean,
            r.mean_shift_pct
        ));
    }
    out
}

/// Shape of one column of a written frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: String,
    pub missing: usize,
}

/// What a table-producing command wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub command: String,
    pub output: String,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<ColumnSummary>,
    /// Command-specific details, such as the drift kind or fitted steps.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl FrameSummary {
    pub fn new(command: impl Into<String>, output: impl Into<String>, frame: &Frame) -> Self {
        let columns = frame
            .iter()
            .map(|(name, column)| ColumnSummary {
                name: name.to_string(),
                kind: match column {
                    Column::Numeric(_) => "numeric".to_string(),
                    Column::Categorical(_) => "categorical".to_string(),
                },
                missing: column.missing_count(),
            })
            .collect();
        FrameSummary {
            command: command.into(),
            output: output.into(),
            n_rows: frame.n_rows(),
            n_cols: frame.n_cols(),
            columns,
            details: serde_json::Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.to_string(), v);
        }
        self
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json(self),
            OutputFormat::Md => {
                let mut out = format!(
                    "# {}\n\nWrote {} rows x {} columns to `{}`.\n\n",
                    self.command, self.n_rows, self.n_cols, self.output
                );
                out.push_str("| Column | Kind | Missing |\n|---|---|---:|\n");
                for c in &self.columns {
                    out.push_str(&format!("| {} | {} | {} |\n", c.name, c.kind, c.missing));
                }
                Ok(out)
            }
            OutputFormat::Summary => {
                let mut out = format!(
                    "{}: wrote {} rows x {} columns to {}\n",
                    self.command, self.n_rows, self.n_cols, self.output
                );
                for (key, value) in &self.details {
                    out.push_str(&format!("  {:<12} {}\n", key, value));
                }
                for c in &self.columns {
                    out.push_str(&format!(
                        "  {:<24} {:<12} missing={}\n",
                        c.name, c.kind, c.missing
                    ));
                }
                Ok(out)
            }
        }
    }
}
