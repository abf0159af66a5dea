//! Bin edges and histogram counting.
//!
//! Two edge schemes are supported:
//! - fixed width over `[0, 1]`, for calibration bins
//! - reference quantiles with open outer bins, for stability indices
//!
//! Counting follows the usual half-open convention: bin `i` covers
//! `[e_i, e_{i+1})` and the last bin is closed on the right.

use super::quantile::{dedup_sorted, linspace, percentile_sorted};
use serde::{Deserialize, Serialize};

/// A strictly increasing sequence of at least two bin edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Build from explicit edges.
    ///
    /// Returns `None` unless there are at least two edges, none are NaN,
    /// and they are strictly increasing.
    pub fn new(edges: Vec<f64>) -> Option<Self> {
        if edges.len() < 2 || edges.iter().any(|e| e.is_nan()) {
            return None;
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self { edges })
    }

    /// `n_bins` equal-width bins over `[0, 1]`. `None` if `n_bins == 0`.
    pub fn uniform_unit(n_bins: usize) -> Option<Self> {
        if n_bins == 0 {
            return None;
        }
        Self::new(linspace(0.0, 1.0, n_bins + 1))
    }

    /// Edges at the `n_bins + 1` evenly spaced percentiles of a sorted
    /// reference sample, with the outer edges opened to `-inf` / `+inf`
    /// and duplicate edges removed.
    ///
    /// `None` if the reference is empty or `n_bins == 0`.
    pub fn from_reference_quantiles(sorted_reference: &[f64], n_bins: usize) -> Option<Self> {
        if sorted_reference.is_empty() || n_bins == 0 {
            return None;
        }
        let mut edges: Vec<f64> = linspace(0.0, 100.0, n_bins + 1)
            .into_iter()
            .map(|q| percentile_sorted(sorted_reference, q))
            .collect();
        let last = edges.len() - 1;
        edges[0] = f64::NEG_INFINITY;
        edges[last] = f64::INFINITY;
        Self::new(dedup_sorted(&edges))
    }

    /// The edge values.
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins (one fewer than the number of edges).
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Index of the half-open bin containing `x`, or `None` if `x` is NaN or
    /// outside `[first, last]`.
    pub fn locate(&self, x: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if x.is_nan() || x < first || x > last {
            return None;
        }
        if x == last {
            return Some(self.n_bins() - 1);
        }
        // Number of edges <= x; x >= first so this is at least 1.
        let upper = self.edges.partition_point(|&e| e <= x);
        Some(upper - 1)
    }

    /// Index of the right-closed bin `(e_i, e_{i+1}]` containing `x`, with
    /// the first bin also closed on the left.
    pub fn locate_right_closed(&self, x: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if x.is_nan() || x < first || x > last {
            return None;
        }
        // Number of edges strictly below x; x == first gives 0.
        let below = self.edges.partition_point(|&e| e < x);
        Some(below.saturating_sub(1))
    }

    /// Count values per bin. Values outside the edges and NaN are ignored.
    pub fn histogram(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_bins()];
        for &v in values {
            if let Some(i) = self.locate(v) {
                counts[i] += 1;
            }
        }
        counts
    }

    /// Bin counts divided by `values.len()`.
    ///
    /// Returns all zeros for an empty sample.
    pub fn proportions(&self, values: &[f64]) -> Vec<f64> {
        let counts = self.histogram(values);
        if values.is_empty() {
            return vec![0.0; counts.len()];
        }
        let n = values.len() as f64;
        counts.into_iter().map(|c| c as f64 / n).collect()
    }
}

/// Number of distinct values among the evenly spaced percentiles of a sorted
/// reference, before the outer edges are opened.
pub fn distinct_quantile_edges(sorted_reference: &[f64], n_bins: usize) -> usize {
    if sorted_reference.is_empty() {
        return 0;
    }
    let edges: Vec<f64> = linspace(0.0, 100.0, n_bins + 1)
        .into_iter()
        .map(|q| percentile_sorted(sorted_reference, q))
        .collect();
    dedup_sorted(&edges).len()
}
