//! Persisted evaluation report.
//!
//! Produces the evaluation report in two forms:
//! - JSON for storage next to a trained model
//! - ASCII for terminal display

use super::classification::{ClassificationReport, ConfusionMatrix};
use super::curve::CalibrationCurve;
use super::evaluator::{ClassificationEvaluator, HardSample, MetricSummary};
use chrono::{DateTime, Utc};
use fd_common::{Result, SCHEMA_VERSION};
use fd_config::ConfigSnapshot;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A complete evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub model_name: String,
    pub threshold: f64,
    pub n_samples: usize,
    pub n_positive: usize,
    pub n_negative: usize,
    /// Scalar metrics keyed by display name.
    pub metrics: MetricSummary,
    pub confusion_matrix: ConfusionMatrix,
    pub classification: ClassificationReport,
    pub calibration: CalibrationCurve,
    pub hard_samples: Vec<HardSample>,
    /// Configuration that produced this report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSnapshot>,
}

impl EvaluationReport {
    pub(crate) fn new(
        eval: &ClassificationEvaluator,
        metrics: MetricSummary,
        calibration: CalibrationCurve,
        hard_samples: Vec<HardSample>,
    ) -> Self {
        let data = eval.data();
        let confusion_matrix = eval.confusion_matrix();
        EvaluationReport {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            model_name: eval.model_name().to_string(),
            threshold: eval.threshold(),
            n_samples: data.len(),
            n_positive: data.positive_count(),
            n_negative: data.negative_count(),
            metrics,
            confusion_matrix,
            classification: ClassificationReport::from_confusion(&confusion_matrix),
            calibration,
            hard_samples,
            config: None,
        }
    }

    /// Attach the configuration snapshot.
    pub fn with_config(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config = Some(snapshot);
        self
    }

    /// Write pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a report previously written by [`EvaluationReport::write_json`].
    pub fn read_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Generate ASCII report for terminal display.
    pub fn ascii_report(&self, curve_width: usize, curve_height: usize) -> String {
        let mut output = String::new();

        output.push_str("╔════════════════════════════════════════════════════════════╗\n");
        output.push_str("║              MODEL EVALUATION REPORT                       ║\n");
        output.push_str("╚════════════════════════════════════════════════════════════╝\n\n");
        output.push_str(&format!(
            "Model: {}  (threshold={})\n\n",
            self.model_name, self.threshold
        ));

        output.push_str("─── Metrics ───────────────────────────────────────────────\n");
        for (name, value) in self.metrics.iter() {
            output.push_str(&format!("  {:<20} {:.6}\n", format!("{}:", name), value));
        }
        output.push('\n');

        output.push_str("─── Data Summary ──────────────────────────────────────────\n");
        output.push_str(&format!("  Total Samples:    {}\n", self.n_samples));
        output.push_str(&format!(
            "  Fraud (1):        {} ({:.2}%)\n",
            self.n_positive,
            100.0 * self.n_positive as f64 / self.n_samples.max(1) as f64
        ));
        output.push_str(&format!(
            "  Legitimate (0):   {} ({:.2}%)\n",
            self.n_negative,
            100.0 * self.n_negative as f64 / self.n_samples.max(1) as f64
        ));
        output.push('\n');

        output.push_str("─── Confusion Matrix ──────────────────────────────────────\n");
        let cm = &self.confusion_matrix;
        output.push_str("                 Pred Legit   Pred Fraud\n");
        output.push_str(&format!(
            "  Actual Legit  {:>11} {:>12}\n",
            cm.true_negatives, cm.false_positives
        ));
        output.push_str(&format!(
            "  Actual Fraud  {:>11} {:>12}\n",
            cm.false_negatives, cm.true_positives
        ));
        output.push('\n');

        output.push_str("─── Classification Report ─────────────────────────────────\n");
        output.push_str(&self.classification.render());
        output.push('\n');

        output.push_str("─── Calibration by Score Bucket ─────────────────────────\n");
        for bin in &self.calibration.bins {
            let lower = (bin.lower * 100.0).round() as i32;
            let upper = (bin.upper * 100.0).round() as i32;
            if bin.count == 0 {
                output.push_str(&format!("  {:>3}-{:>3}: no data\n", lower, upper));
            } else {
                output.push_str(&format!(
                    "  {:>3}-{:>3}: Predicted {:>5.1}%, Actual {:>5.1}% (n={})\n",
                    lower,
                    upper,
                    bin.mean_predicted * 100.0,
                    bin.actual_rate * 100.0,
                    bin.count
                ));
            }
        }
        output.push('\n');

        output.push_str("─── Calibration Curve ─────────────────────────────────────\n");
        output.push_str(&self.calibration.ascii_curve(curve_width, curve_height));
        output.push('\n');

        output.push_str("─── Hardest Misclassifications ────────────────────────────\n");
        if self.hard_samples.is_empty() {
            output.push_str("  No misclassified samples.\n");
        }
        for s in &self.hard_samples {
            output.push_str(&format!(
                "  [{}]  idx={:>7}  true={}  prob={:.4}  loss={:.4}\n",
                s.kind.short(),
                s.index,
                s.true_label,
                s.pred_prob,
                s.loss
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fd_config::{ConfigSource, ToolkitConfig};
    use tempfile::TempDir;

    fn report() -> EvaluationReport {
        let y = [0.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let p = [0.1, 0.9, 0.2, 0.8, 0.6, 0.05];
        ClassificationEvaluator::new(&y, &p, 0.5, "Test")
            .unwrap()
            .report(3)
            .unwrap()
    }

    #[test]
    fn test_report_fields() {
        let r = report();
        assert_eq!(r.schema_version, SCHEMA_VERSION);
        assert_eq!(r.n_samples, 6);
        assert_eq!(r.n_positive, 3);
        assert_eq!(r.hard_samples.len(), 3);
        assert_eq!(r.confusion_matrix.total(), 6);
        assert_eq!(r.calibration.num_bins, 10);
        assert!(r.config.is_none());
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eval.json");
        let snapshot = ConfigSnapshot::new(
            &ToolkitConfig::default(),
            None,
            ConfigSource::BuiltinDefault,
            None,
        );
        let r = report().with_config(snapshot);
        r.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"ROC-AUC\""));
        assert!(text.contains("\"false_negative\""));

        let back = EvaluationReport::read_json(&path).unwrap();
        assert_eq!(back.model_name, r.model_name);
        assert_eq!(back.generated_at, r.generated_at);
        assert_eq!(back.confusion_matrix, r.confusion_matrix);
        assert_eq!(
            back.hard_samples.iter().map(|s| s.index).collect::<Vec<_>>(),
            r.hard_samples.iter().map(|s| s.index).collect::<Vec<_>>()
        );
        assert_eq!(
            back.config.map(|c| c.hash),
            r.config.map(|c| c.hash)
        );
    }

    #[test]
    fn test_ascii_report_sections() {
        let text = report().ascii_report(40, 10);
        for section in [
            "MODEL EVALUATION REPORT",
            "Metrics",
            "Confusion Matrix",
            "Classification Report",
            "Calibration Curve",
            "Hardest Misclassifications",
        ] {
            assert!(text.contains(section), "missing {section}");
        }
    }
}
