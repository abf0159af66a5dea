//! Fraud detection toolkit configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for toolkit.json / toolkit.toml
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation
//! - Config snapshots embedded in persisted reports

pub mod load;
pub mod resolve;
pub mod snapshot;
pub mod toolkit;
pub mod validate;

pub use load::{load_config, ConfigError, LoadedConfig};
pub use resolve::{resolve_config_path, ConfigSource, ResolvedPath};
pub use snapshot::ConfigSnapshot;
pub use toolkit::{DriftConfig, EvaluationConfig, ToolkitConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
