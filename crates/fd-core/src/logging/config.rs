//! Where log settings come from.
//!
//! Precedence, lowest first: built-in defaults, `RUST_LOG` (only the
//! `fd_core` directive or a bare level), `FD_LOG`, `FD_LOG_FORMAT` and
//! `FD_LOG_TIMESTAMPS`, then the `-v`/`-q` and `--log-format` flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log level. Takes precedence over RUST_LOG.
pub const ENV_LOG_LEVEL: &str = "FD_LOG";
/// `human` or `jsonl`.
pub const ENV_LOG_FORMAT: &str = "FD_LOG_FORMAT";
/// `0` or `false` drops timestamps from human output.
pub const ENV_LOG_TIMESTAMPS: &str = "FD_LOG_TIMESTAMPS";

/// How events are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One formatted line per event.
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("log format must be human or jsonl, got {:?}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most verbose level that is still emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Off,
    ];

    /// Directive spelling, as accepted by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Level for a `-v` count and a `--quiet` flag.
    ///
    /// Returns `None` when neither was given, so environment settings apply.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.trim().to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "none" | "quiet" => "off".to_string(),
            other => other.to_string(),
        };
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("unrecognized log level {:?}", s))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level set for `fd_core` in a RUST_LOG directive string.
///
/// Accepts a bare level (`debug`) or a target directive (`fd_core=debug`);
/// the target directive wins when both are present.
fn level_from_rust_log(value: &str) -> Option<LogLevel> {
    let mut bare = None;
    for directive in value.split(',') {
        match directive.split_once('=') {
            Some((target, level)) if target.trim() == "fd_core" => return level.parse().ok(),
            Some(_) => {}
            None => bare = directive.parse().ok().or(bare),
        }
    }
    bare
}

fn flag_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Resolved logging settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human lines with a timestamp. JSON lines always carry one.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Settings from the process environment, with CLI values on top.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(cli_level, cli_format, |key| std::env::var(key).ok())
    }

    /// [`LogConfig::from_env`] with an injectable variable lookup.
    ///
    /// Unparseable values are ignored rather than reported, so a typo in
    /// the environment never stops a run.
    pub fn from_lookup(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_level = match lookup(ENV_LOG_LEVEL) {
            Some(value) => value.parse().ok(),
            None => lookup("RUST_LOG").as_deref().and_then(level_from_rust_log),
        };
        let env_format = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok());
        let env_timestamps = lookup(ENV_LOG_TIMESTAMPS).as_deref().and_then(flag_value);

        let defaults = LogConfig::default();
        LogConfig {
            format: cli_format.or(env_format).unwrap_or(defaults.format),
            level: cli_level.or(env_level).unwrap_or(defaults.level),
            timestamps: env_timestamps.unwrap_or(defaults.timestamps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_names() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Jsonl));
        assert_eq!(" human ".parse::<LogFormat>(), Ok(LogFormat::Human));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Jsonl.to_string(), "jsonl");
    }

    #[test]
    fn test_level_names_round_trip() {
        for level in LogLevel::ALL {
            assert_eq!(level.as_str().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("quiet".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0, false), None);
        assert_eq!(LogLevel::from_verbosity(1, false), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_verbosity(3, false), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_verbosity(2, true), Some(LogLevel::Error));
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(LogConfig::from_lookup(None, None, env(&[])), LogConfig::default());
    }

    #[test]
    fn test_fd_log_beats_rust_log() {
        let cfg = LogConfig::from_lookup(None, None, env(&[("FD_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(cfg.level, LogLevel::Warn);
    }

    #[test]
    fn test_rust_log_directives() {
        let cfg = LogConfig::from_lookup(None, None, env(&[("RUST_LOG", "info,fd_core=debug")]));
        assert_eq!(cfg.level, LogLevel::Debug);
        let cfg = LogConfig::from_lookup(None, None, env(&[("RUST_LOG", "hyper=trace")]));
        assert_eq!(cfg.level, LogLevel::Info);
        let cfg = LogConfig::from_lookup(None, None, env(&[("RUST_LOG", "error")]));
        assert_eq!(cfg.level, LogLevel::Error);
    }

    #[test]
    fn test_cli_overrides_env() {
        let cfg = LogConfig::from_lookup(
            Some(LogLevel::Trace),
            Some(LogFormat::Human),
            env(&[("FD_LOG", "error"), ("FD_LOG_FORMAT", "jsonl")]),
        );
        assert_eq!(cfg.level, LogLevel::Trace);
        assert_eq!(cfg.format, LogFormat::Human);

        let cfg = LogConfig::from_lookup(None, None, env(&[("FD_LOG_FORMAT", "jsonl")]));
        assert_eq!(cfg.format, LogFormat::Jsonl);
    }

    #[test]
    fn test_timestamps_flag() {
        let cfg = LogConfig::from_lookup(None, None, env(&[("FD_LOG_TIMESTAMPS", "0")]));
        assert!(!cfg.timestamps);
        let cfg = LogConfig::from_lookup(None, None, env(&[("FD_LOG_TIMESTAMPS", "maybe")]));
        assert!(cfg.timestamps);
    }
}
