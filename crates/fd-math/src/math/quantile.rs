//! Order statistics: sorting, evenly spaced grids and percentiles.
//!
//! Percentiles use linear interpolation between closest ranks, the
//! convention most array libraries default to: the `q`-th percentile of a
//! sorted sample of length `n` sits at virtual index `q / 100 * (n - 1)`.

use std::cmp::Ordering;

/// Return a sorted copy of `values`.
///
/// Uses `f64::total_cmp`, so NaN sorts after `+inf`. Callers that care
/// should filter non-finite values first.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// `num` evenly spaced samples over `[start, stop]`, endpoint included.
///
/// Samples are computed as `start + i * step` and the final sample is
/// pinned to `stop` exactly.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let div = (num - 1) as f64;
            let step = (stop - start) / div;
            let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            out[num - 1] = stop;
            out
        }
    }
}

/// Linear interpolation that is exact at both ends.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// The `q`-th percentile (`q` in `[0, 100]`) of an already sorted sample.
///
/// Returns NaN for an empty sample or an out-of-range `q`.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || q.is_nan() || !(0.0..=100.0).contains(&q) {
        return f64::NAN;
    }
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let virtual_index = q / 100.0 * (n - 1) as f64;
    let lo = (virtual_index.floor() as usize).min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let t = virtual_index - lo as f64;
    if lo == hi {
        return sorted[lo];
    }
    lerp(sorted[lo], sorted[hi], t)
}

/// Percentiles of an unsorted sample at each of `qs`.
pub fn percentiles(values: &[f64], qs: &[f64]) -> Vec<f64> {
    let sorted = sorted_copy(values);
    qs.iter().map(|&q| percentile_sorted(&sorted, q)).collect()
}

/// The `p`-quantile (`p` in `[0, 1]`) of an unsorted sample.
pub fn quantile(values: &[f64], p: f64) -> f64 {
    let sorted = sorted_copy(values);
    percentile_sorted(&sorted, p * 100.0)
}

/// Collapse consecutive equal values in a sorted slice.
///
/// Returns the distinct values in order; `-0.0` and `0.0` compare equal.
pub fn dedup_sorted(sorted: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(sorted.len());
    for &v in sorted {
        match out.last() {
            Some(last) if last.partial_cmp(&v) == Some(Ordering::Equal) => {}
            _ => out.push(v),
        }
    }
    out
}
