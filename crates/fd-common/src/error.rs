//! Error types for the fraud detection toolkit.
//!
//! Every error carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A remediation hint for humans
//!
//! The numeric kernels are deterministic, so no error is retryable. A caller
//! either fixes its input or reports the failure.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 13,
//!   "category": "input",
//!   "message": "label at index 4 is 2, expected 0 or 1",
//!   "context": { "index": 4 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller-supplied arrays, tables or parameters are invalid.
    Input,
    /// The data cannot support the requested statistic.
    Distribution,
    /// Configuration file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Distribution => write!(f, "distribution"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the toolkit.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("length mismatch: {left} has {left_len} values but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("{what} is empty")]
    EmptyInput { what: String },

    #[error("label at index {index} is {value}, expected 0 or 1")]
    LabelOutOfRange { index: usize, value: f64 },

    #[error("probability at index {index} is {value}, expected a value in [0, 1]")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    #[error("unknown drift kind {0:?} (expected shift, scale, spike or missing)")]
    UnknownDriftKind(String),

    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("column {name} is not numeric")]
    NonNumericColumn { name: String },

    // Distribution errors (20-29)
    #[error(
        "degenerate reference distribution: {distinct_edges} distinct bin edge(s) from {requested_bins} requested bins"
    )]
    DegenerateDistribution {
        distinct_edges: usize,
        requested_bins: usize,
    },

    /// An error raised while processing one named feature. Code and
    /// category are those of the wrapped error.
    #[error("feature {feature}: {source}")]
    InFeature {
        feature: String,
        #[source]
        source: Box<Error>,
    },

    // Configuration errors (30-39)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Shorthand for [`Error::EmptyInput`].
    pub fn empty(what: impl Into<String>) -> Self {
        Error::EmptyInput { what: what.into() }
    }

    /// Attach a feature name, unless the error already names its column.
    pub fn for_feature(self, feature: impl Into<String>) -> Self {
        match self {
            Error::UnknownColumn { .. } | Error::NonNumericColumn { .. } | Error::InFeature { .. } => {
                self
            }
            other => Error::InFeature {
                feature: feature.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through feature context.
    pub fn root(&self) -> &Error {
        match self {
            Error::InFeature { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Distribution errors
    /// - 30-39: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidInput(_) => 10,
            Error::LengthMismatch { .. } => 11,
            Error::EmptyInput { .. } => 12,
            Error::LabelOutOfRange { .. } => 13,
            Error::ProbabilityOutOfRange { .. } => 14,
            Error::UnknownDriftKind(_) => 15,
            Error::UnknownColumn { .. } => 16,
            Error::NonNumericColumn { .. } => 17,
            Error::DegenerateDistribution { .. } => 20,
            Error::InFeature { source, .. } => source.code(),
            Error::Config(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Csv(_) => 62,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidInput(_)
            | Error::LengthMismatch { .. }
            | Error::EmptyInput { .. }
            | Error::LabelOutOfRange { .. }
            | Error::ProbabilityOutOfRange { .. }
            | Error::UnknownDriftKind(_)
            | Error::UnknownColumn { .. }
            | Error::NonNumericColumn { .. } => ErrorCategory::Input,

            Error::DegenerateDistribution { .. } => ErrorCategory::Distribution,

            Error::InFeature { source, .. } => source.category(),

            Error::Config(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) | Error::Csv(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Check the arguments passed to the toolkit.",
            Error::LengthMismatch { .. } => {
                "Labels and probabilities must be aligned by index; check that both come from the same rows."
            }
            Error::EmptyInput { .. } => {
                "Provide at least one observation. For drift reports, check that the feature is not entirely missing."
            }
            Error::LabelOutOfRange { .. } => "Labels must be binary: encode the positive class as 1 and the negative class as 0.",
            Error::ProbabilityOutOfRange { .. } => {
                "Pass predicted probabilities, not raw scores or logits. Apply a sigmoid first if needed."
            }
            Error::UnknownDriftKind(_) => "Use one of: shift, scale, spike, missing.",
            Error::UnknownColumn { .. } => "Check the column name against the CSV header.",
            Error::NonNumericColumn { .. } => {
                "Drift statistics need numeric columns. Encode categorical features first (see 'fd-core preprocess')."
            }
            Error::DegenerateDistribution { .. } => {
                "The reference sample is constant. Exclude the feature from PSI or widen the reference window."
            }
            Error::InFeature { source, .. } => source.remediation(),
            Error::Config(_) => "Run 'fd-core config validate' to check the configuration file.",
            Error::Io(_) => "Check that the file exists and that permissions allow access.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq .' or regenerate the file.",
            Error::Csv(_) => "Check that the CSV has a header row and a consistent number of fields.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Invalid Input",
            Error::LengthMismatch { .. } => "Length Mismatch",
            Error::EmptyInput { .. } => "Empty Input",
            Error::LabelOutOfRange { .. } => "Label Out Of Range",
            Error::ProbabilityOutOfRange { .. } => "Probability Out Of Range",
            Error::UnknownDriftKind(_) => "Unknown Drift Kind",
            Error::UnknownColumn { .. } => "Unknown Column",
            Error::NonNumericColumn { .. } => "Non-Numeric Column",
            Error::DegenerateDistribution { .. } => "Degenerate Distribution",
            Error::InFeature { source, .. } => source.headline(),
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
            Error::Csv(_) => "CSV Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., index, column name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::LabelOutOfRange { index, value } | Error::ProbabilityOutOfRange { index, value } => {
                context.insert("index".to_string(), serde_json::json!(index));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::UnknownColumn { name } | Error::NonNumericColumn { name } => {
                context.insert("column".to_string(), serde_json::json!(name));
            }
            Error::DegenerateDistribution {
                distinct_edges,
                requested_bins,
            } => {
                context.insert("distinct_edges".to_string(), serde_json::json!(distinct_edges));
                context.insert("requested_bins".to_string(), serde_json::json!(requested_bins));
            }
            Error::InFeature { feature, .. } => {
                context.insert("feature".to_string(), serde_json::json!(feature));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Format for a terminal: message, then the fix.
    pub fn to_human(&self) -> String {
        format!("✗ {}\n  Fix: {}", self.message, self.remediation)
    }
}
