//! Fuzz target for toolkit configuration parsing.
//!
//! JSON and TOML parsing plus semantic validation should return errors,
//! never panic.

#![no_main]

use fd_config::toolkit::ConfigFormat;
use fd_config::{validate_config, ToolkitConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for format in [ConfigFormat::Json, ConfigFormat::Toml] {
        if let Ok(config) = ToolkitConfig::parse(text, format) {
            let _ = validate_config(&config);
        }
    }
});
