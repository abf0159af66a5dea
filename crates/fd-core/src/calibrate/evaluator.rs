//! One-call evaluation of a binary classifier.
//!
//! ```ignore
//! use fd_core::calibrate::ClassificationEvaluator;
//!
//! let eval = ClassificationEvaluator::new(&y_true, &y_prob, 0.5, "LightGBM")?;
//! let metrics = eval.summary()?;
//! println!("{}", eval.render_summary()?);
//! let worst = eval.hard_samples(Some(&features), 10)?;
//! ```

use super::classification::{ClassificationReport, ConfusionMatrix};
use super::curve::CalibrationCurve;
use super::metrics::{
    average_precision_checked, brier_score_checked, log_loss_checked, per_example_log_loss,
    precision_recall_curve_checked, roc_curve_checked, LabeledScores, PrecisionRecallCurve,
    RocCurve,
};
use super::report::EvaluationReport;
use crate::table::Frame;
use fd_common::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of calibration bins.
pub const DEFAULT_CALIBRATION_BINS: usize = 10;

/// Scalar evaluation metrics, serialized under their display names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricSummary {
    #[serde(rename = "ROC-AUC")]
    pub roc_auc: f64,
    #[serde(rename = "Average Precision")]
    pub average_precision: f64,
    #[serde(rename = "Log Loss")]
    pub log_loss: f64,
    #[serde(rename = "Brier Score")]
    pub brier_score: f64,
    #[serde(rename = "ECE")]
    pub ece: f64,
}

impl MetricSummary {
    /// Metric names in display order.
    pub const NAMES: [&'static str; 5] =
        ["ROC-AUC", "Average Precision", "Log Loss", "Brier Score", "ECE"];

    /// `(name, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::NAMES.into_iter().zip([
            self.roc_auc,
            self.average_precision,
            self.log_loss,
            self.brier_score,
            self.ece,
        ])
    }

    /// Look a metric up by display name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Which way a misclassification went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Actual 0, predicted 1.
    FalsePositive,
    /// Actual 1, predicted 0.
    FalseNegative,
}

impl ErrorKind {
    pub fn short(&self) -> &'static str {
        match self {
            ErrorKind::FalsePositive => "FP",
            ErrorKind::FalseNegative => "FN",
        }
    }
}

/// One confidently wrong prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HardSample {
    /// Row index in the evaluated data.
    pub index: usize,
    pub true_label: u8,
    pub pred_prob: f64,
    /// Binary cross-entropy of this example.
    pub loss: f64,
    pub kind: ErrorKind,
}

/// Hardest misclassifications, optionally with their feature rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HardSamples {
    pub samples: Vec<HardSample>,
    /// Rows of the feature frame in the same order as `samples`.
    pub features: Option<Frame>,
}

impl HardSamples {
    pub fn indices(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.index).collect()
    }
}

/// Evaluation of predicted probabilities against binary outcomes.
///
/// Inputs are validated once at construction. Every query recomputes from
/// the stored data.
#[derive(Debug, Clone)]
pub struct ClassificationEvaluator {
    model_name: String,
    threshold: f64,
    calibration_bins: usize,
    data: LabeledScores,
    predicted: Vec<bool>,
}

impl ClassificationEvaluator {
    /// Validate inputs and fix predicted labels as `p >= threshold`.
    pub fn new(
        y_true: &[f64],
        y_prob: &[f64],
        threshold: f64,
        model_name: impl Into<String>,
    ) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(Error::invalid(format!(
                "threshold must be finite, got {}",
                threshold
            )));
        }
        let data = LabeledScores::new(y_true, y_prob)?;
        let predicted = data.probs().iter().map(|&p| p >= threshold).collect();
        Ok(Self {
            model_name: model_name.into(),
            threshold,
            calibration_bins: DEFAULT_CALIBRATION_BINS,
            data,
            predicted,
        })
    }

    /// Use `n_bins` calibration bins for ECE and the calibration curve.
    pub fn with_calibration_bins(mut self, n_bins: usize) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::invalid("n_bins must be at least 1"));
        }
        self.calibration_bins = n_bins;
        Ok(self)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn calibration_bins(&self) -> usize {
        self.calibration_bins
    }

    pub fn data(&self) -> &LabeledScores {
        &self.data
    }

    pub fn predicted(&self) -> &[bool] {
        &self.predicted
    }

    /// ROC-AUC, Average Precision, Log Loss, Brier Score and ECE.
    ///
    /// Fails with `InvalidInput` when only one class is present.
    pub fn summary(&self) -> Result<MetricSummary> {
        let summary = MetricSummary {
            roc_auc: self.roc_curve()?.auc(),
            average_precision: average_precision_checked(&self.data)?,
            log_loss: log_loss_checked(&self.data),
            brier_score: brier_score_checked(&self.data),
            ece: self.calibration_curve()?.ece,
        };
        debug!(
            model = %self.model_name,
            threshold = self.threshold,
            n = self.data.len(),
            roc_auc = summary.roc_auc,
            average_precision = summary.average_precision,
            log_loss = summary.log_loss,
            brier_score = summary.brier_score,
            ece = summary.ece,
            "evaluation summary computed"
        );
        Ok(summary)
    }

    pub fn roc_curve(&self) -> Result<RocCurve> {
        roc_curve_checked(&self.data)
    }

    pub fn precision_recall_curve(&self) -> Result<PrecisionRecallCurve> {
        precision_recall_curve_checked(&self.data)
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_predictions(self.data.labels(), &self.predicted)
    }

    pub fn classification_report(&self) -> ClassificationReport {
        ClassificationReport::from_confusion(&self.confusion_matrix())
    }

    pub fn calibration_curve(&self) -> Result<CalibrationCurve> {
        CalibrationCurve::from_scores(&self.data, self.calibration_bins)
    }

    /// The `n` misclassified examples with the highest log-loss.
    ///
    /// Sorted by loss descending; equal losses keep ascending index order.
    /// When `features` is given its rows are returned in the same order,
    /// and it must have one row per example.
    pub fn hard_samples(&self, features: Option<&Frame>, n: usize) -> Result<HardSamples> {
        if let Some(frame) = features {
            if frame.n_rows() != self.data.len() {
                return Err(Error::invalid(format!(
                    "feature frame has {} rows but {} predictions were evaluated",
                    frame.n_rows(),
                    self.data.len()
                )));
            }
        }

        let losses = per_example_log_loss(&self.data);
        let labels = self.data.labels();
        let mut wrong: Vec<usize> = (0..self.data.len())
            .filter(|&i| labels[i] != self.predicted[i])
            .collect();
        wrong.sort_by(|&a, &b| losses[b].total_cmp(&losses[a]).then(a.cmp(&b)));
        wrong.truncate(n);

        let samples: Vec<HardSample> = wrong
            .iter()
            .map(|&i| HardSample {
                index: i,
                true_label: u8::from(labels[i]),
                pred_prob: self.data.probs()[i],
                loss: losses[i],
                kind: if labels[i] {
                    ErrorKind::FalseNegative
                } else {
                    ErrorKind::FalsePositive
                },
            })
            .collect();

        let features = match features {
            Some(frame) => Some(frame.take_rows(&wrong)?),
            None => None,
        };

        debug!(
            model = %self.model_name,
            requested = n,
            returned = samples.len(),
            "hard samples selected"
        );
        Ok(HardSamples { samples, features })
    }

    /// Text block with the scalar metrics and the classification report.
    pub fn render_summary(&self) -> Result<String> {
        let summary = self.summary()?;
        let rule = "=".repeat(55);
        let mut out = String::new();
        out.push_str(&format!("{rule}\n"));
        out.push_str(&format!(
            "  {}: Evaluation Report  (threshold={})\n",
            self.model_name, self.threshold
        ));
        out.push_str(&format!("{rule}\n"));
        for (name, value) in summary.iter() {
            out.push_str(&format!("  {:22} {:.6}\n", name, value));
        }
        out.push_str(&format!("{rule}\n\n"));
        out.push_str(&self.classification_report().render());
        Ok(out)
    }

    /// Text listing of hard samples.
    pub fn render_hard_samples(&self, hard: &HardSamples) -> String {
        let rule = "=".repeat(65);
        let mut out = String::new();
        out.push_str(&format!("{rule}\n"));
        out.push_str(&format!(
            "  Top {} Hardest Misclassifications  ({})\n",
            hard.samples.len(),
            self.model_name
        ));
        out.push_str(&format!("{rule}\n"));
        for s in &hard.samples {
            out.push_str(&format!(
                "  [{}]  idx={:>7}  true={}  prob={:.4}  loss={:.4}\n",
                s.kind.short(),
                s.index,
                s.true_label,
                s.pred_prob,
                s.loss
            ));
        }
        out
    }

    /// Everything above in one serializable report.
    pub fn report(&self, n_hard: usize) -> Result<EvaluationReport> {
        Ok(EvaluationReport::new(
            self,
            self.summary()?,
            self.calibration_curve()?,
            self.hard_samples(None, n_hard)?.samples,
        ))
    }
}
