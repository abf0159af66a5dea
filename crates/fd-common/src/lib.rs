//! Fraud detection toolkit common types and errors.
//!
//! This crate provides foundational types shared across the toolkit crates:
//! - The error taxonomy with stable codes
//! - Output format selection

pub mod error;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;

/// Schema version stamped into persisted reports.
pub const SCHEMA_VERSION: &str = "1.0.0";
