//! Fuzz target for PSI and KS on arbitrary samples.
//!
//! Non-finite values, empty samples and degenerate references (for the
//! strict `psi`) must come back as errors, and successful results must be
//! in range.

#![no_main]

use arbitrary::Arbitrary;
use fd_core::drift::{ks_drift_test, psi, psi_open_bins, DEFAULT_PSI_EPSILON};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    reference: Vec<f64>,
    current: Vec<f64>,
    n_bins: u8,
}

fuzz_target!(|input: Input| {
    if let Ok(value) = psi(
        &input.reference,
        &input.current,
        usize::from(input.n_bins),
        DEFAULT_PSI_EPSILON,
    ) {
        assert!(value >= -1e-9, "negative psi {value}");
    }
    if let Ok(value) = psi_open_bins(
        &input.reference,
        &input.current,
        usize::from(input.n_bins),
        DEFAULT_PSI_EPSILON,
    ) {
        assert!(value >= -1e-9, "negative open-bin psi {value}");
    }
    if let Ok(ks) = ks_drift_test(&input.reference, &input.current, 0.05) {
        assert!((0.0..=1.0).contains(&ks.statistic));
    }
});
