//! Fraud Detection Toolkit Core Library
//!
//! Statistical building blocks for a fraud-detection workflow:
//! - Calibration metrics and the classification evaluator (`calibrate`)
//! - PSI, KS and multi-feature drift reports, plus drift simulation (`drift`)
//! - Fit/transform preprocessing over tables (`preprocess`)
//! - The `Frame` table type with CSV I/O (`table`)
//! - Exit codes, logging, output rendering and JSON schemas for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod calibrate;
pub mod drift;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod preprocess;
pub mod schema;
pub mod table;

pub use calibrate::{
    brier_score, expected_calibration_error, ClassificationEvaluator, EvaluationReport,
    MetricSummary,
};
pub use drift::{drift_report, ks_drift_test, psi, simulate_drift, DriftKind, DriftReport};
pub use table::{Column, Frame};
