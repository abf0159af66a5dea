//! Calibration and evaluation of binary fraud classifiers.
//!
//! # Metrics
//!
//! - **Brier Score**: Mean squared error of probability predictions (0 = perfect, 1 = worst)
//! - **Log Loss**: Cross-entropy of predictions, clipped at 1e-15 (lower is better)
//! - **Expected Calibration Error (ECE)**: Weighted average of per-bin calibration errors
//! - **ROC-AUC**: Area under ROC curve (0.5 = random, 1.0 = perfect)
//! - **Average Precision**: Step-wise area under the precision-recall curve
//!
//! # Usage
//!
//! ```ignore
//! use fd_core::calibrate::{brier_score, ClassificationEvaluator};
//!
//! let bs = brier_score(&[0.0, 1.0], &[0.1, 0.8])?;
//! let eval = ClassificationEvaluator::new(&y_true, &y_prob, 0.5, "Model")?;
//! let report = eval.report(10)?;
//! println!("{}", report.ascii_report(50, 12));
//! ```

pub mod classification;
pub mod curve;
pub mod evaluator;
pub mod metrics;
pub mod report;

pub use classification::*;
pub use curve::*;
pub use evaluator::*;
pub use metrics::*;
pub use report::*;
