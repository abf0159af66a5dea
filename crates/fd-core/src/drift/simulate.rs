//! Synthetic drift injection.
//!
//! Perturbs one numeric column of a frame so a monitoring pipeline can be
//! exercised without live data. Row selection is seeded and reproducible.

use crate::table::{Column, Frame};
use fd_common::{Error, Result};
use fd_math::{quantile, std_dev};
use rand::rngs::StdRng;
use rand::SeedableRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_MAGNITUDE: f64 = 1.0;
pub const DEFAULT_SEED: u64 = 42;

/// Kind of perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DriftKind {
    /// Add `magnitude` sample standard deviations to every value.
    Shift,
    /// Multiply every value by `1 + magnitude`.
    Scale,
    /// Overwrite a fraction of rows with an extreme value.
    Spike,
    /// Blank out a fraction of rows.
    Missing,
}

impl DriftKind {
    pub const ALL: [DriftKind; 4] = [
        DriftKind::Shift,
        DriftKind::Scale,
        DriftKind::Spike,
        DriftKind::Missing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftKind::Shift => "shift",
            DriftKind::Scale => "scale",
            DriftKind::Spike => "spike",
            DriftKind::Missing => "missing",
        }
    }
}

impl std::fmt::Display for DriftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DriftKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DriftKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownDriftKind(s.to_string()))
    }
}

/// Rows touched by `spike` and `missing`: `⌊len * min(0.1 * magnitude, 0.5)⌋`.
pub fn affected_rows(len: usize, magnitude: f64) -> usize {
    let fraction = (0.1 * magnitude).clamp(0.0, 0.5);
    (len as f64 * fraction).floor() as usize
}

/// Return a copy of `frame` with `feature` perturbed.
pub fn simulate_drift(
    frame: &Frame,
    feature: &str,
    kind: DriftKind,
    magnitude: f64,
    seed: u64,
) -> Result<Frame> {
    if !magnitude.is_finite() {
        return Err(Error::invalid(format!(
            "magnitude must be finite, got {}",
            magnitude
        )));
    }
    let mut cells = frame.numeric(feature)?.to_vec();
    let present: Vec<f64> = cells.iter().flatten().copied().collect();

    match kind {
        DriftKind::Shift => {
            if present.len() < 2 {
                return Err(Error::invalid(format!(
                    "shift needs at least 2 non-missing values in {}, found {}",
                    feature,
                    present.len()
                )));
            }
            let offset = magnitude * std_dev(&present, 1);
            for v in cells.iter_mut().flatten() {
                *v += offset;
            }
        }
        DriftKind::Scale => {
            for v in cells.iter_mut().flatten() {
                *v *= 1.0 + magnitude;
            }
        }
        DriftKind::Spike => {
            if present.is_empty() {
                return Err(Error::empty(format!("column {}", feature)));
            }
            let spike = quantile(&present, 0.99) * (1.0 + magnitude);
            for i in pick_rows(cells.len(), magnitude, seed) {
                cells[i] = Some(spike);
            }
        }
        DriftKind::Missing => {
            for i in pick_rows(cells.len(), magnitude, seed) {
                cells[i] = None;
            }
        }
    }

    debug!(feature, kind = %kind, magnitude, seed, "drift injected");
    let mut out = frame.clone();
    out.set_column(feature, Column::Numeric(cells))?;
    Ok(out)
}

fn pick_rows(len: usize, magnitude: f64, seed: u64) -> Vec<usize> {
    let k = affected_rows(len, magnitude);
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, len, k).into_vec()
}
