//! Calibration curve generation.
//!
//! Reliability-diagram data: per-bin mean predicted probability against the
//! observed positive rate, plus ECE and MCE.

use super::metrics::LabeledScores;
use fd_common::{Error, Result};
use fd_math::{stable_sum, BinEdges};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single point on a calibration curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalibrationBin {
    /// Bin lower bound (exclusive, except the first bin).
    pub lower: f64,
    /// Bin upper bound (inclusive).
    pub upper: f64,
    /// Mean predicted probability in this bin (bin midpoint when empty).
    pub mean_predicted: f64,
    /// Actual positive rate in this bin.
    pub actual_rate: f64,
    /// Number of samples in this bin.
    pub count: usize,
    /// Calibration error for this bin.
    pub error: f64,
}

/// A calibration curve (reliability diagram data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalibrationCurve {
    /// Number of bins used.
    pub num_bins: usize,
    /// The bins.
    pub bins: Vec<CalibrationBin>,
    /// Expected calibration error: count-weighted mean of bin errors.
    pub ece: f64,
    /// Maximum calibration error over non-empty bins.
    pub mce: f64,
}

impl CalibrationCurve {
    /// Bin validated scores into `num_bins` equal-width right-closed bins.
    pub fn from_scores(data: &LabeledScores, num_bins: usize) -> Result<Self> {
        let edges = BinEdges::uniform_unit(num_bins)
            .ok_or_else(|| Error::invalid("n_bins must be at least 1"))?;
        let e = edges.as_slice();

        let mut counts = vec![0usize; num_bins];
        let mut positives = vec![0usize; num_bins];
        let mut prob_sums: Vec<Vec<f64>> = vec![Vec::new(); num_bins];
        for (&label, &p) in data.labels().iter().zip(data.probs()) {
            // Probabilities are validated to [0, 1], so every one lands.
            if let Some(b) = edges.locate_right_closed(p) {
                counts[b] += 1;
                if label {
                    positives[b] += 1;
                }
                prob_sums[b].push(p);
            }
        }

        let n = data.len() as f64;
        let mut weighted = Vec::with_capacity(num_bins);
        let mut mce = 0.0f64;

        let bins: Vec<CalibrationBin> = (0..num_bins)
            .map(|i| {
                let (lower, upper) = (e[i], e[i + 1]);
                let count = counts[i];
                if count == 0 {
                    return CalibrationBin {
                        lower,
                        upper,
                        mean_predicted: (lower + upper) / 2.0,
                        actual_rate: 0.0,
                        count: 0,
                        error: 0.0,
                    };
                }
                let mean_predicted = stable_sum(&prob_sums[i]) / count as f64;
                let actual_rate = positives[i] as f64 / count as f64;
                let error = (mean_predicted - actual_rate).abs();
                weighted.push(count as f64 * error);
                mce = mce.max(error);
                CalibrationBin {
                    lower,
                    upper,
                    mean_predicted,
                    actual_rate,
                    count,
                    error,
                }
            })
            .collect();

        Ok(CalibrationCurve {
            num_bins,
            bins,
            ece: stable_sum(&weighted) / n,
            mce,
        })
    }

    /// Non-empty bins only.
    pub fn populated_bins(&self) -> impl Iterator<Item = &CalibrationBin> {
        self.bins.iter().filter(|b| b.count > 0)
    }

    /// Generate ASCII representation of the calibration curve.
    ///
    /// `·` marks the diagonal of perfect calibration and `●` each non-empty
    /// bin.
    pub fn ascii_curve(&self, width: usize, height: usize) -> String {
        let width = width.max(10);
        let height = height.max(3);
        let mut output = String::new();

        output.push_str(&format!(
            "Calibration Curve (ECE={:.4}, MCE={:.4})\n",
            self.ece, self.mce
        ));
        output.push_str(&"─".repeat(width + 4));
        output.push('\n');

        let mut grid = vec![vec![' '; width]; height];

        for x in 0..width {
            let frac = x as f64 / (width - 1) as f64;
            let y = height - 1 - ((frac * (height - 1) as f64).round() as usize).min(height - 1);
            grid[y][x] = '·';
        }

        for bin in self.populated_bins() {
            let x = ((bin.mean_predicted * (width - 1) as f64).round() as usize).min(width - 1);
            let y = height - 1
                - ((bin.actual_rate * (height - 1) as f64).round() as usize).min(height - 1);
            grid[y][x] = '●';
        }

        for (i, row) in grid.iter().enumerate() {
            let y_val = 1.0 - (i as f64 / (height - 1) as f64);
            output.push_str(&format!("{:.1}│", y_val));
            output.extend(row.iter());
            output.push('\n');
        }

        output.push_str("   └");
        output.push_str(&"─".repeat(width));
        output.push('\n');
        let gap = width / 2 - 2;
        output.push_str("    0");
        output.push_str(&" ".repeat(gap));
        output.push_str("0.5");
        output.push_str(&" ".repeat(width - gap - 5));
        output.push_str("1.0\n");
        output.push_str("          Predicted Probability\n");

        output
    }
}
