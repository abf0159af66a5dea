//! Configuration path discovery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Direct path to the config file.
pub const ENV_CONFIG_PATH: &str = "FD_TOOLKIT_CONFIG";

/// Directory that contains `toolkit.json`.
pub const ENV_CONFIG_DIR: &str = "FD_TOOLKIT_CONFIG_DIR";

/// File name searched for in every config directory.
pub const CONFIG_FILENAME: &str = "toolkit.json";

/// Subdirectory name under the XDG and system config roots.
pub const APP_DIR: &str = "fd-toolkit";

/// How the configuration in use was located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// `--config`.
    CliArgument,
    /// `FD_TOOLKIT_CONFIG` or `FD_TOOLKIT_CONFIG_DIR`.
    Environment,
    /// `~/.config/fd-toolkit/`.
    XdgConfig,
    /// `/etc/fd-toolkit/`.
    SystemConfig,
    /// No file; compiled-in defaults.
    #[default]
    BuiltinDefault,
}

impl ConfigSource {
    pub fn describe(self) -> &'static str {
        match self {
            ConfigSource::CliArgument => "CLI argument",
            ConfigSource::Environment => "environment variable",
            ConfigSource::XdgConfig => "XDG config",
            ConfigSource::SystemConfig => "system config",
            ConfigSource::BuiltinDefault => "builtin default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A discovered configuration path, or none when defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve the configuration path from the process environment.
///
/// An explicit CLI path is returned even when it does not exist, so the
/// loader can report it. Every other candidate is used only if the file
/// exists. Order:
///
/// 1. `--config`
/// 2. `FD_TOOLKIT_CONFIG`
/// 3. `FD_TOOLKIT_CONFIG_DIR/toolkit.json`
/// 4. `~/.config/fd-toolkit/toolkit.json`
/// 5. `/etc/fd-toolkit/toolkit.json`
/// 6. none (built-in defaults)
pub fn resolve_config_path(cli_path: Option<&Path>) -> ResolvedPath {
    resolve_with(
        cli_path,
        |key| std::env::var_os(key).map(PathBuf::from),
        dirs::config_dir(),
    )
}

/// [`resolve_config_path`] with injected environment and XDG root.
pub fn resolve_with(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<PathBuf>,
    xdg_root: Option<PathBuf>,
) -> ResolvedPath {
    if let Some(path) = cli_path {
        return ResolvedPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    let candidates = [
        (env(ENV_CONFIG_PATH), ConfigSource::Environment),
        (
            env(ENV_CONFIG_DIR).map(|dir| dir.join(CONFIG_FILENAME)),
            ConfigSource::Environment,
        ),
        (
            xdg_root.map(|root| root.join(APP_DIR).join(CONFIG_FILENAME)),
            ConfigSource::XdgConfig,
        ),
        (
            Some(system_config_dir().join(CONFIG_FILENAME)),
            ConfigSource::SystemConfig,
        ),
    ];

    candidates
        .into_iter()
        .find_map(|(path, source)| {
            path.filter(|p| p.is_file())
                .map(|path| ResolvedPath {
                    path: Some(path),
                    source,
                })
        })
        .unwrap_or_default()
}

/// System config directory.
pub fn system_config_dir() -> PathBuf {
    Path::new("/etc").join(APP_DIR)
}
