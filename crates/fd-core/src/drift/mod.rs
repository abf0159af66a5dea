//! Data-drift monitoring.
//!
//! - [`psi`]: Population Stability Index over reference-quantile bins
//! - [`ks_drift_test`]: two-sample Kolmogorov–Smirnov test
//! - [`drift_report`]: per-feature table of both, with alerts
//! - [`simulate_drift`]: inject synthetic drift into a frame

pub mod ks;
pub mod psi;
pub mod report;
pub mod simulate;

pub use ks::*;
pub use psi::*;
pub use report::*;
pub use simulate::*;
