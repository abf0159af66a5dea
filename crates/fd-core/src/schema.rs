//! JSON Schema generation for persisted and printed payloads.
//!
//! # Usage
//!
//! ```bash
//! fd-core schema --list
//! fd-core schema evaluation
//! fd-core schema drift --compact
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::calibrate::EvaluationReport;
pub use crate::drift::DriftReport;
pub use fd_config::{ConfigSnapshot, ToolkitConfig};

/// Available schema names with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "evaluation",
            "Evaluation report: metrics, classification breakdown, calibration curve, hard samples",
        ),
        ("drift", "Per-feature drift report with PSI and KS statistics"),
        ("config", "Toolkit configuration file (JSON or TOML)"),
        ("config-snapshot", "Configuration provenance embedded in reports"),
    ]
}

/// Generate JSON Schema for a payload by name.
///
/// Returns `None` if the name is unknown.
pub fn generate_schema(name: &str) -> Option<Value> {
    let schema = match name {
        "evaluation" => schema_for!(EvaluationReport),
        "drift" => schema_for!(DriftReport),
        "config" => schema_for!(ToolkitConfig),
        "config-snapshot" => schema_for!(ConfigSnapshot),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}

/// Schema output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

/// Format a schema value for output.
pub fn format_schema(schema: &Value, format: SchemaFormat) -> String {
    let rendered = match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    };
    // A Value always serializes.
    rendered.unwrap_or_default()
}
