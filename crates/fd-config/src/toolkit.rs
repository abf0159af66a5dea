//! Toolkit configuration types.
//!
//! Matches the layout of `toolkit.json`:
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "evaluation": { "threshold": 0.5, "calibration_bins": 10 },
//!   "drift": { "psi_bins": 10, "ks_threshold": 0.05 }
//! }
//! ```
//! Every section and field is optional; missing values take the defaults
//! below. The same layout is accepted as TOML.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

/// Root configuration for the toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolkitConfig {
    /// Configuration schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Classifier evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Drift monitoring settings.
    #[serde(default)]
    pub drift: DriftConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            description: None,
            evaluation: EvaluationConfig::default(),
            drift: DriftConfig::default(),
        }
    }
}

/// Settings for `ClassificationEvaluator` and the `evaluate` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Decision threshold: predicted label is `p >= threshold`.
    pub threshold: f64,

    /// Number of equal-width bins for ECE and the calibration curve.
    pub calibration_bins: usize,

    /// How many misclassified examples to report.
    pub hard_sample_count: usize,

    /// Display name in reports.
    pub model_name: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            calibration_bins: 10,
            hard_sample_count: 10,
            model_name: "Model".to_string(),
        }
    }
}

/// Settings for PSI / KS drift monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DriftConfig {
    /// Number of reference-quantile bins for PSI.
    pub psi_bins: usize,

    /// Floor applied to bin proportions before taking logs.
    pub psi_epsilon: f64,

    /// KS p-value below which a feature is flagged as drifted.
    pub ks_threshold: f64,

    /// PSI at or above this is a MEDIUM alert.
    pub psi_moderate: f64,

    /// PSI at or above this is a HIGH alert.
    pub psi_significant: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            psi_bins: 10,
            psi_epsilon: 1e-4,
            ks_threshold: 0.05,
            psi_moderate: 0.10,
            psi_significant: 0.20,
        }
    }
}

/// On-disk encodings accepted for the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the encoding from a file extension. Anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

impl ToolkitConfig {
    /// Load configuration from a file, choosing JSON or TOML by extension.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse configuration text in the given encoding.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ValidationError> {
        match format {
            ConfigFormat::Json => Self::from_json_str(content),
            ConfigFormat::Toml => Self::from_toml_str(content),
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text).map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Pretty JSON rendering, as written by `config show`.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.schema_version, "1.0.0");
        assert_eq!(config.evaluation.threshold, 0.5);
        assert_eq!(config.evaluation.calibration_bins, 10);
        assert_eq!(config.evaluation.model_name, "Model");
        assert_eq!(config.drift.psi_bins, 10);
        assert_eq!(config.drift.psi_epsilon, 1e-4);
        assert_eq!(config.drift.ks_threshold, 0.05);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = ToolkitConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ToolkitConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config =
            ToolkitConfig::from_json_str(r#"{"evaluation": {"threshold": 0.3}}"#).unwrap();
        assert_eq!(config.evaluation.threshold, 0.3);
        assert_eq!(config.evaluation.hard_sample_count, 10);
        assert_eq!(config.drift, DriftConfig::default());
    }

    #[test]
    fn test_toml_parsing() {
        let text = r#"
schema_version = "1.0.0"

[drift]
psi_bins = 20
ks_threshold = 0.01
"#;
        let config = ToolkitConfig::from_toml_str(text).unwrap();
        assert_eq!(config.drift.psi_bins, 20);
        assert_eq!(config.drift.ks_threshold, 0.01);
        assert_eq!(config.drift.psi_significant, 0.20);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ToolkitConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("toolkit")), ConfigFormat::Json);
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = ToolkitConfig::default().to_json_pretty().unwrap();
        let back = ToolkitConfig::from_json_str(&json).unwrap();
        assert_eq!(back, ToolkitConfig::default());
    }
}
