//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::toolkit::{DriftConfig, EvaluationConfig, ToolkitConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 30,
            ValidationError::ParseError(_) => 31,
            ValidationError::SemanticError(_) => 32,
            ValidationError::InvalidValue { .. } => 33,
            ValidationError::VersionMismatch { .. } => 34,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a toolkit configuration semantically.
pub fn validate_config(config: &ToolkitConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }
    validate_evaluation(&config.evaluation)?;
    validate_drift(&config.drift)?;
    Ok(())
}

fn validate_evaluation(eval: &EvaluationConfig) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&eval.threshold) {
        return Err(invalid(
            "evaluation.threshold",
            format!("must be in [0, 1], got {}", eval.threshold),
        ));
    }
    if eval.calibration_bins < 1 {
        return Err(invalid("evaluation.calibration_bins", "must be at least 1"));
    }
    if eval.model_name.trim().is_empty() {
        return Err(invalid("evaluation.model_name", "must not be empty"));
    }
    Ok(())
}

fn validate_drift(drift: &DriftConfig) -> ValidationResult<()> {
    if drift.psi_bins < 1 {
        return Err(invalid("drift.psi_bins", "must be at least 1"));
    }
    if !(drift.psi_epsilon > 0.0 && drift.psi_epsilon < 0.5) {
        return Err(invalid(
            "drift.psi_epsilon",
            format!("must be in (0, 0.5), got {}", drift.psi_epsilon),
        ));
    }
    if !(drift.ks_threshold > 0.0 && drift.ks_threshold < 1.0) {
        return Err(invalid(
            "drift.ks_threshold",
            format!("must be in (0, 1), got {}", drift.ks_threshold),
        ));
    }
    if drift.psi_moderate.is_nan() || drift.psi_moderate < 0.0 {
        return Err(invalid(
            "drift.psi_moderate",
            format!("must be non-negative, got {}", drift.psi_moderate),
        ));
    }
    if drift.psi_significant.is_nan() || drift.psi_moderate >= drift.psi_significant {
        return Err(ValidationError::SemanticError(format!(
            "drift.psi_moderate ({}) must be below drift.psi_significant ({})",
            drift.psi_moderate, drift.psi_significant
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        validate_config(&ToolkitConfig::default()).unwrap();
    }

    #[test]
    fn test_version_mismatch() {
        let mut config = ToolkitConfig::default();
        config.schema_version = "0.9.0".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 34);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = ToolkitConfig::default();
        config.evaluation.threshold = 1.5;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("evaluation.threshold"));
    }

    #[test]
    fn test_threshold_nan_rejected() {
        let mut config = ToolkitConfig::default();
        config.evaluation.threshold = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_bins_rejected() {
        let mut config = ToolkitConfig::default();
        config.drift.psi_bins = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { .. })
        ));

        let mut config = ToolkitConfig::default();
        config.evaluation.calibration_bins = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_epsilon_bounds() {
        for eps in [0.0, -1e-4, 0.5, f64::NAN] {
            let mut config = ToolkitConfig::default();
            config.drift.psi_epsilon = eps;
            assert!(validate_config(&config).is_err(), "eps={eps}");
        }
    }

    #[test]
    fn test_ks_threshold_bounds() {
        for t in [0.0, 1.0, 2.0] {
            let mut config = ToolkitConfig::default();
            config.drift.ks_threshold = t;
            assert!(validate_config(&config).is_err(), "threshold={t}");
        }
    }

    #[test]
    fn test_alert_levels_must_be_ordered() {
        let mut config = ToolkitConfig::default();
        config.drift.psi_moderate = 0.3;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::SemanticError(_)));
    }
}
