//! Thresholded classification metrics: confusion matrix and per-class report.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display names for class 0 and class 1.
pub const CLASS_NAMES: [&str; 2] = ["Legitimate", "Fraud"];

/// 2x2 confusion matrix for binary labels. Rows are actual, columns predicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[bool], predicted: &[bool]) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (false, false) => cm.true_negatives += 1,
                (false, true) => cm.false_positives += 1,
                (true, false) => cm.false_negatives += 1,
                (true, true) => cm.true_positives += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    /// `[[tn, fp], [fn, tp]]`.
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negatives + self.true_positives, self.total())
    }
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class breakdown with accuracy and macro/weighted averages.
///
/// Ratios with a zero denominator are reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        // Class 0 treats "legitimate" as the positive outcome.
        let neg = {
            let precision = ratio(cm.true_negatives, cm.true_negatives + cm.false_negatives);
            let recall = ratio(cm.true_negatives, cm.true_negatives + cm.false_positives);
            ClassMetrics {
                label: CLASS_NAMES[0].to_string(),
                precision,
                recall,
                f1: f1(precision, recall),
                support: cm.true_negatives + cm.false_positives,
            }
        };
        let pos = {
            let precision = ratio(cm.true_positives, cm.true_positives + cm.false_positives);
            let recall = ratio(cm.true_positives, cm.true_positives + cm.false_negatives);
            ClassMetrics {
                label: CLASS_NAMES[1].to_string(),
                precision,
                recall,
                f1: f1(precision, recall),
                support: cm.true_positives + cm.false_negatives,
            }
        };

        let total = cm.total();
        let macro_avg = AveragedMetrics {
            precision: (neg.precision + pos.precision) / 2.0,
            recall: (neg.recall + pos.recall) / 2.0,
            f1: (neg.f1 + pos.f1) / 2.0,
            support: total,
        };
        let weight = |a: f64, b: f64| {
            if total == 0 {
                0.0
            } else {
                (a * neg.support as f64 + b * pos.support as f64) / total as f64
            }
        };
        let weighted_avg = AveragedMetrics {
            precision: weight(neg.precision, pos.precision),
            recall: weight(neg.recall, pos.recall),
            f1: weight(neg.f1, pos.f1),
            support: total,
        };

        ClassificationReport {
            classes: vec![neg, pos],
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Fixed-width text table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10} {:>10}\n\n",
            "", "precision", "recall", "f1-score", "support"
        ));
        for c in &self.classes {
            out.push_str(&format!(
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                c.label, c.precision, c.recall, c.f1, c.support
            ));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}\n",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        ));
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            out.push_str(&format!(
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                name, avg.precision, avg.recall, avg.f1, avg.support
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_counts() {
        let actual = [false, false, true, true, true];
        let predicted = [false, true, false, true, true];
        let cm = ConfusionMatrix::from_predictions(&actual, &predicted);
        assert_eq!(cm.as_rows(), [[1, 1], [1, 2]]);
        assert_eq!(cm.total(), 5);
        assert!((cm.accuracy() - 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_report_values() {
        let cm = ConfusionMatrix {
            true_negatives: 90,
            false_positives: 10,
            false_negatives: 5,
            true_positives: 15,
        };
        let report = ClassificationReport::from_confusion(&cm);
        let fraud = &report.classes[1];
        assert_eq!(fraud.label, "Fraud");
        assert!((fraud.precision - 0.6).abs() < 1e-12);
        assert!((fraud.recall - 0.75).abs() < 1e-12);
        assert!((fraud.f1 - 2.0 * 0.6 * 0.75 / 1.35).abs() < 1e-12);
        assert_eq!(fraud.support, 20);
        assert_eq!(report.classes[0].support, 100);
        assert!((report.accuracy - 105.0 / 120.0).abs() < 1e-12);
        assert_eq!(report.weighted_avg.support, 120);
    }

    #[test]
    fn test_zero_division_is_zero() {
        // Nothing predicted positive.
        let cm = ConfusionMatrix::from_predictions(&[false, true], &[false, false]);
        let report = ClassificationReport::from_confusion(&cm);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
    }

    #[test]
    fn test_render_contains_rows() {
        let cm = ConfusionMatrix::from_predictions(&[false, true], &[false, true]);
        let text = ClassificationReport::from_confusion(&cm).render();
        for needle in ["Legitimate", "Fraud", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(needle), "missing {needle}");
        }
    }
}
