//! Probability and ranking metrics for binary classifiers.
//!
//! Provides:
//! - Brier Score
//! - Log Loss
//! - Expected Calibration Error (ECE)
//! - ROC curve and ROC-AUC
//! - Precision-recall curve and Average Precision
//!
//! Every public function validates its inputs through [`LabeledScores`].

use super::curve::CalibrationCurve;
use fd_common::{Error, Result};
use fd_math::{binary_log_loss, stable_sum, LOG_LOSS_EPS};
use serde::{Deserialize, Serialize};

/// Binary labels aligned by index with predicted probabilities.
///
/// Construction enforces: equal non-zero lengths, labels in {0, 1}, and
/// probabilities in [0, 1] (NaN rejected).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledScores {
    labels: Vec<bool>,
    probs: Vec<f64>,
}

impl LabeledScores {
    pub fn new(y_true: &[f64], y_prob: &[f64]) -> Result<Self> {
        if y_true.len() != y_prob.len() {
            return Err(Error::LengthMismatch {
                left: "y_true",
                left_len: y_true.len(),
                right: "y_prob",
                right_len: y_prob.len(),
            });
        }
        if y_true.is_empty() {
            return Err(Error::empty("y_true"));
        }

        let mut labels = Vec::with_capacity(y_true.len());
        for (index, &value) in y_true.iter().enumerate() {
            if value == 0.0 {
                labels.push(false);
            } else if value == 1.0 {
                labels.push(true);
            } else {
                return Err(Error::LabelOutOfRange { index, value });
            }
        }
        for (index, &value) in y_prob.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ProbabilityOutOfRange { index, value });
            }
        }

        Ok(Self {
            labels,
            probs: y_prob.to_vec(),
        })
    }

    /// Build from boolean labels.
    pub fn from_bools(labels: &[bool], y_prob: &[f64]) -> Result<Self> {
        let y_true: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        Self::new(&y_true, y_prob)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    pub fn negative_count(&self) -> usize {
        self.len() - self.positive_count()
    }

    /// Fail unless both classes are present.
    pub fn require_both_classes(&self) -> Result<()> {
        let pos = self.positive_count();
        if pos == 0 || pos == self.len() {
            return Err(Error::invalid(format!(
                "only one class present in y_true ({} positive of {}); ROC-AUC and average precision are undefined",
                pos,
                self.len()
            )));
        }
        Ok(())
    }

    /// Cumulative (fp, tp) counts at each distinct score, scores descending.
    fn descending_counts(&self) -> Vec<ThresholdCounts> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.probs[b].total_cmp(&self.probs[a]));

        let mut out: Vec<ThresholdCounts> = Vec::new();
        let (mut tp, mut fp) = (0usize, 0usize);
        for (pos, &idx) in order.iter().enumerate() {
            if self.labels[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            let is_last_of_score = order
                .get(pos + 1)
                .map_or(true, |&next| self.probs[next] != self.probs[idx]);
            if is_last_of_score {
                out.push(ThresholdCounts {
                    threshold: self.probs[idx],
                    tp,
                    fp,
                });
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
struct ThresholdCounts {
    threshold: f64,
    tp: usize,
    fp: usize,
}

/// Receiver operating characteristic curve.
///
/// Points are ordered by decreasing threshold. The first point is
/// `(0, 0)` at threshold `+inf`; each later point groups all tied scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Trapezoidal area under the curve.
    pub fn auc(&self) -> f64 {
        let areas: Vec<f64> = self
            .fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .collect();
        stable_sum(&areas)
    }
}

/// Precision-recall curve.
///
/// Thresholds are increasing. `precision` and `recall` have one more
/// entry than `thresholds`; the final point is `(precision 1, recall 0)`.
/// Thresholds below the one that first reaches full recall are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Mean squared error between probabilities and outcomes.
pub fn brier_score(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    Ok(brier_score_checked(&LabeledScores::new(y_true, y_prob)?))
}

pub(crate) fn brier_score_checked(data: &LabeledScores) -> f64 {
    let squares: Vec<f64> = data
        .labels
        .iter()
        .zip(&data.probs)
        .map(|(&l, &p)| {
            let y = if l { 1.0 } else { 0.0 };
            (p - y) * (p - y)
        })
        .collect();
    stable_sum(&squares) / data.len() as f64
}

/// Mean binary cross-entropy, probabilities clipped to `[1e-15, 1 - 1e-15]`.
pub fn log_loss(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    Ok(log_loss_checked(&LabeledScores::new(y_true, y_prob)?))
}

pub(crate) fn log_loss_checked(data: &LabeledScores) -> f64 {
    let losses = per_example_log_loss(data);
    stable_sum(&losses) / data.len() as f64
}

/// Per-example binary cross-entropy with the same clipping as [`log_loss`].
pub fn per_example_log_loss(data: &LabeledScores) -> Vec<f64> {
    data.labels
        .iter()
        .zip(&data.probs)
        .map(|(&l, &p)| binary_log_loss(l, p, LOG_LOSS_EPS))
        .collect()
}

/// Expected Calibration Error over `n_bins` equal-width bins.
///
/// Bins are right-closed `(lo, hi]` except the first, which also includes
/// 0. The weighted sum is divided by the full sample size; empty bins
/// contribute nothing.
pub fn expected_calibration_error(y_true: &[f64], y_prob: &[f64], n_bins: usize) -> Result<f64> {
    let data = LabeledScores::new(y_true, y_prob)?;
    Ok(CalibrationCurve::from_scores(&data, n_bins)?.ece)
}

/// ROC curve with tied scores grouped.
pub fn roc_curve(y_true: &[f64], y_prob: &[f64]) -> Result<RocCurve> {
    roc_curve_checked(&LabeledScores::new(y_true, y_prob)?)
}

pub(crate) fn roc_curve_checked(data: &LabeledScores) -> Result<RocCurve> {
    data.require_both_classes()?;
    let pos = data.positive_count() as f64;
    let neg = data.negative_count() as f64;

    let counts = data.descending_counts();
    let mut fpr = Vec::with_capacity(counts.len() + 1);
    let mut tpr = Vec::with_capacity(counts.len() + 1);
    let mut thresholds = Vec::with_capacity(counts.len() + 1);
    fpr.push(0.0);
    tpr.push(0.0);
    thresholds.push(f64::INFINITY);
    for c in counts {
        fpr.push(c.fp as f64 / neg);
        tpr.push(c.tp as f64 / pos);
        thresholds.push(c.threshold);
    }
    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}

/// Area under the ROC curve (trapezoidal rule, ties grouped).
pub fn roc_auc(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    Ok(roc_curve(y_true, y_prob)?.auc())
}

/// Precision-recall curve.
pub fn precision_recall_curve(y_true: &[f64], y_prob: &[f64]) -> Result<PrecisionRecallCurve> {
    precision_recall_curve_checked(&LabeledScores::new(y_true, y_prob)?)
}

pub(crate) fn precision_recall_curve_checked(data: &LabeledScores) -> Result<PrecisionRecallCurve> {
    data.require_both_classes()?;
    let pos = data.positive_count();

    let counts = data.descending_counts();
    let full_recall = counts
        .iter()
        .position(|c| c.tp == pos)
        .unwrap_or(counts.len() - 1);
    let kept = &counts[..=full_recall];

    let mut precision: Vec<f64> = kept
        .iter()
        .rev()
        .map(|c| c.tp as f64 / (c.tp + c.fp) as f64)
        .collect();
    let mut recall: Vec<f64> = kept.iter().rev().map(|c| c.tp as f64 / pos as f64).collect();
    let thresholds: Vec<f64> = kept.iter().rev().map(|c| c.threshold).collect();
    precision.push(1.0);
    recall.push(0.0);

    Ok(PrecisionRecallCurve {
        precision,
        recall,
        thresholds,
    })
}

/// Average precision: `Σ (R_k - R_{k-1}) · P_k` over distinct thresholds in
/// decreasing order.
pub fn average_precision(y_true: &[f64], y_prob: &[f64]) -> Result<f64> {
    average_precision_checked(&LabeledScores::new(y_true, y_prob)?)
}

pub(crate) fn average_precision_checked(data: &LabeledScores) -> Result<f64> {
    data.require_both_classes()?;
    let pos = data.positive_count() as f64;

    let mut prev_recall = 0.0;
    let mut terms = Vec::new();
    for c in data.descending_counts() {
        let recall = c.tp as f64 / pos;
        let precision = c.tp as f64 / (c.tp + c.fp) as f64;
        terms.push((recall - prev_recall) * precision);
        prev_recall = recall;
    }
    Ok(stable_sum(&terms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            LabeledScores::new(&[0.0, 1.0], &[0.5]),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(matches!(
            LabeledScores::new(&[], &[]),
            Err(Error::EmptyInput { .. })
        ));
        assert!(matches!(
            LabeledScores::new(&[0.0, 2.0], &[0.5, 0.5]),
            Err(Error::LabelOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            LabeledScores::new(&[0.0, 1.0], &[0.5, 1.5]),
            Err(Error::ProbabilityOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            LabeledScores::new(&[0.0, 1.0], &[f64::NAN, 0.5]),
            Err(Error::ProbabilityOutOfRange { index: 0, .. })
        ));
        assert!(matches!(
            LabeledScores::new(&[f64::NAN], &[0.5]),
            Err(Error::LabelOutOfRange { .. })
        ));
    }

    #[test]
    fn test_boundary_probabilities_are_legitimate() {
        let data = LabeledScores::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_brier_perfect_and_worst() {
        let y = [0.0, 1.0, 0.0, 1.0];
        assert_eq!(brier_score(&y, &y).unwrap(), 0.0);
        assert_eq!(brier_score(&y, &[1.0, 0.0, 1.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_brier_known_value() {
        let bs = brier_score(&[1.0, 0.0], &[0.8, 0.4]).unwrap();
        assert!(approx_eq(bs, (0.04 + 0.16) / 2.0, 1e-15));
    }

    #[test]
    fn test_log_loss_known_value() {
        let ll = log_loss(&[1.0, 0.0], &[0.8, 0.4]).unwrap();
        let expected = -(0.8f64.ln() + 0.6f64.ln()) / 2.0;
        assert!(approx_eq(ll, expected, 1e-12));
    }

    #[test]
    fn test_log_loss_finite_at_hard_mistakes() {
        let ll = log_loss(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(ll.is_finite());
        assert!(approx_eq(ll, -(1e-15f64).ln(), 1e-6));
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let y = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(roc_auc(&y, &[0.1, 0.2, 0.8, 0.9]).unwrap(), 1.0);
        assert_eq!(roc_auc(&y, &[0.9, 0.8, 0.2, 0.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_roc_auc_known_value() {
        // Standard example: AUC = 0.75.
        let auc = roc_auc(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!(approx_eq(auc, 0.75, 1e-12));
    }

    #[test]
    fn test_roc_auc_ties_count_half() {
        let auc = roc_auc(&[0.0, 1.0], &[0.5, 0.5]).unwrap();
        assert!(approx_eq(auc, 0.5, 1e-12));
    }

    #[test]
    fn test_roc_curve_shape() {
        let curve = roc_curve(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(curve.thresholds[0], f64::INFINITY);
        assert_eq!(&curve.thresholds[1..], &[0.8, 0.4, 0.35, 0.1]);
    }

    #[test]
    fn test_single_class_is_invalid() {
        let err = roc_auc(&[1.0, 1.0], &[0.2, 0.9]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(average_precision(&[0.0, 0.0], &[0.2, 0.9]).is_err());
    }

    #[test]
    fn test_average_precision_known_value() {
        // Recall steps: 0.5 at P=1, 0.5 at P=2/3 -> 0.5 + 1/3.
        let ap = average_precision(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!(approx_eq(ap, 0.5 + 1.0 / 3.0, 1e-12));
    }

    #[test]
    fn test_average_precision_perfect_ranking() {
        let ap = average_precision(&[0.0, 1.0, 1.0], &[0.1, 0.7, 0.9]).unwrap();
        assert!(approx_eq(ap, 1.0, 1e-15));
    }

    #[test]
    fn test_precision_recall_curve_shape() {
        let curve =
            precision_recall_curve(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(curve.thresholds, vec![0.35, 0.4, 0.8]);
        assert_eq!(curve.recall, vec![1.0, 0.5, 0.5, 0.0]);
        assert!(approx_eq(curve.precision[0], 2.0 / 3.0, 1e-15));
        assert_eq!(&curve.precision[1..], &[0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_ece_perfect_calibration_is_zero() {
        // 0.25 bin: 1 of 4 positive; 0.75 bin: 3 of 4 positive.
        let y = [1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let p = [0.25, 0.25, 0.25, 0.25, 0.75, 0.75, 0.75, 0.75];
        let ece = expected_calibration_error(&y, &p, 10).unwrap();
        assert!(approx_eq(ece, 0.0, 1e-12));
    }

    #[test]
    fn test_ece_known_value() {
        // Two bins: [0, 0.5] holds p=0.2 (y=1), (0.5, 1] holds p=0.9 (y=1).
        let ece = expected_calibration_error(&[1.0, 1.0], &[0.2, 0.9], 2).unwrap();
        assert!(approx_eq(ece, (0.8 + 0.1) / 2.0, 1e-12));
    }

    #[test]
    fn test_ece_zero_probability_counts() {
        let ece = expected_calibration_error(&[1.0], &[0.0], 10).unwrap();
        assert!(approx_eq(ece, 1.0, 1e-15));
    }

    #[test]
    fn test_ece_rejects_zero_bins() {
        assert!(expected_calibration_error(&[1.0], &[0.5], 0).is_err());
    }
}
