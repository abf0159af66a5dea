//! Loading: resolve, read, parse, validate, snapshot.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::resolve::{resolve_config_path, ConfigSource};
use crate::snapshot::ConfigSnapshot;
use crate::toolkit::{ConfigFormat, ToolkitConfig};
use crate::validate::{validate_config, ValidationError};

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::NotFound { .. } => 35,
            ConfigError::IoError { .. } => 30,
            ConfigError::ParseError { source, .. } => source.code(),
            ConfigError::ValidationError(e) => e.code(),
        }
    }
}

/// Configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ToolkitConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, read, parse and validate the toolkit configuration.
///
/// Falls back to [`ToolkitConfig::default`] when no file is found. An
/// explicit `--config` path that does not exist is an error.
pub fn load_config(cli_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let resolved = resolve_config_path(cli_path);

    let Some(path) = resolved.path else {
        let config = ToolkitConfig::default();
        let snapshot = ConfigSnapshot::new(&config, None, ConfigSource::BuiltinDefault, None);
        return Ok(LoadedConfig {
            config,
            path: None,
            source: ConfigSource::BuiltinDefault,
            snapshot,
        });
    };

    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
        path: path.clone(),
        source,
    })?;
    let config = ToolkitConfig::parse(&raw, ConfigFormat::from_path(&path)).map_err(|source| {
        ConfigError::ParseError {
            path: path.clone(),
            source,
        }
    })?;
    validate_config(&config)?;

    let snapshot = ConfigSnapshot::new(&config, Some(&path), resolved.source, Some(&raw));
    Ok(LoadedConfig {
        config,
        path: Some(path),
        source: resolved.source,
        snapshot,
    })
}
