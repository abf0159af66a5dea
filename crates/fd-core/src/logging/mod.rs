//! Tracing setup for the `fd-core` binary.
//!
//! Events go to stderr, either as formatted lines or as one JSON object per
//! line. stdout carries only command payloads.
//!
//! ```ignore
//! use fd_core::logging::{event_names, generate_run_id, init_logging, LogConfig, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let run_id = generate_run_id();
//! tracing::info!(run_id = %run_id, event = event_names::RUN_STARTED, stage = %Stage::Init, "starting");
//! ```

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Only this crate's events, at the configured level. Dependencies stay
/// quiet whatever RUST_LOG says.
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::new(format!("fd_core={}", config.level))
}

fn output_layer(config: &LogConfig) -> BoxedLayer {
    match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Human, with_time) => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if with_time {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` if one was already installed; the existing subscriber
/// is left in place.
pub fn init_logging(config: &LogConfig) -> bool {
    tracing_subscriber::registry()
        .with(output_layer(config).with_filter(build_filter(config)))
        .try_init()
        .is_ok()
}

/// `run-` followed by 12 hex digits of a v4 UUID.
pub fn generate_run_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &id[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filter_targets_crate() {
        let config = LogConfig {
            level: LogLevel::Debug,
            ..LogConfig::default()
        };
        assert_eq!(build_filter(&config).to_string(), "fd_core=debug");
    }

    #[test]
    fn test_output_layer_for_each_format() {
        for format in [LogFormat::Human, LogFormat::Jsonl] {
            for timestamps in [true, false] {
                let config = LogConfig {
                    format,
                    timestamps,
                    ..LogConfig::default()
                };
                let _layer = output_layer(&config);
            }
        }
    }
}
