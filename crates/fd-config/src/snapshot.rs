//! Configuration snapshots for persisted reports.
//!
//! A snapshot records which configuration produced a report, so a stored
//! evaluation can be traced back to its thresholds and bin counts.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::ConfigSource;
use crate::toolkit::ToolkitConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the config was loaded from, if any.
    #[serde(default)]
    pub path: Option<String>,

    /// Where the config came from.
    pub source: String,

    /// SHA-256 of the raw file content, or of the canonical JSON of the
    /// effective config when defaults are used.
    pub hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSummary {
    pub threshold: f64,
    pub calibration_bins: usize,
    pub psi_bins: usize,
    pub ks_threshold: f64,
}

impl ConfigSnapshot {
    /// Create a snapshot from loaded configuration.
    ///
    /// `raw` is the file content the config was parsed from.
    pub fn new(
        config: &ToolkitConfig,
        path: Option<&std::path::Path>,
        source: ConfigSource,
        raw: Option<&str>,
    ) -> Self {
        let hash = match raw {
            Some(content) => hash_content(content),
            None => hash_content(&serde_json::to_string(config).unwrap_or_default()),
        };

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            path: path.map(|p| p.display().to_string()),
            source: source.to_string(),
            hash,
            summary: ConfigSummary {
                threshold: config.evaluation.threshold,
                calibration_bins: config.evaluation.calibration_bins,
                psi_bins: config.drift.psi_bins,
                ks_threshold: config.drift.ks_threshold,
            },
        }
    }

    /// Check whether two snapshots describe the same configuration content.
    pub fn same_config(&self, other: &ConfigSnapshot) -> bool {
        self.hash == other.hash
    }
}

/// SHA-256 of a string, hex-encoded.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content_known_value() {
        assert_eq!(
            hash_content(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_content("abc").len(), 64);
    }

    #[test]
    fn test_snapshot_of_defaults() {
        let config = ToolkitConfig::default();
        let snap = ConfigSnapshot::new(&config, None, ConfigSource::BuiltinDefault, None);
        assert_eq!(snap.source, "builtin default");
        assert!(snap.path.is_none());
        assert_eq!(snap.summary.psi_bins, 10);
        assert_eq!(snap.hash.len(), 64);
    }

    #[test]
    fn test_same_config_compares_hashes() {
        let config = ToolkitConfig::default();
        let a = ConfigSnapshot::new(&config, None, ConfigSource::BuiltinDefault, Some("{}"));
        let b = ConfigSnapshot::new(&config, None, ConfigSource::Environment, Some("{}"));
        let c = ConfigSnapshot::new(&config, None, ConfigSource::Environment, Some("{ }"));
        assert!(a.same_config(&b));
        assert!(!a.same_config(&c));
    }
}
