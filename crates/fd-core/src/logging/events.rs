//! Event names and stages for structured log output.
//!
//! The CLI attaches these as `event` and `stage` fields so JSONL logs can
//! be filtered without parsing messages.

use serde::{Deserialize, Serialize};

/// Stages of a CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading input tables.
    Load,
    Evaluate,
    Drift,
    Simulate,
    Preprocess,
    /// Writing payloads and files.
    Output,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Evaluate => "evaluate",
            Stage::Drift => "drift",
            Stage::Simulate => "simulate",
            Stage::Preprocess => "preprocess",
            Stage::Output => "output",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    // Input
    pub const TABLE_LOADED: &str = "table.loaded";

    // Commands
    pub const EVALUATE_FINISHED: &str = "evaluate.finished";
    pub const REPORT_WRITTEN: &str = "report.written";
    pub const DRIFT_FEATURE: &str = "drift.feature";
    pub const DRIFT_DETECTED: &str = "drift.detected";
    pub const SIMULATE_FINISHED: &str = "simulate.finished";
    pub const PREPROCESS_FINISHED: &str = "preprocess.finished";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization_matches_display() {
        for stage in [Stage::Init, Stage::Load, Stage::Drift, Stage::Output] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn test_event_names_are_dotted() {
        for name in [
            event_names::RUN_STARTED,
            event_names::DRIFT_DETECTED,
            event_names::REPORT_WRITTEN,
        ] {
            assert_eq!(name.split('.').count(), 2, "{name}");
        }
    }
}
