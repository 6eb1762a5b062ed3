//! Type 2 quantiles (inverse empirical CDF with averaging), Hyndman & Fan (1996).
//!
//! For a sorted sample `x` of size `n` at probability `p`:
//! ```text
//! h = n * p + 0.5
//! q = (x[floor(h)] + x[ceil(h)]) / 2
//! ```
//! with 1-based indices clamped to `1..=n`.

/// Probabilities reported for each null distribution: median, 95th, 99th.
pub const NULL_SUMMARY_PROBS: [f64; 3] = [0.5, 0.95, 0.99];

fn type2_indices(n: usize, p: f64) -> (usize, usize) {
    let h = n as f64 * p + 0.5;
    let floor_idx = (h.floor() as usize).saturating_sub(1).min(n - 1);
    let ceil_idx = (h.ceil() as usize).saturating_sub(1).min(n - 1);
    (floor_idx, ceil_idx)
}

/// Type 2 quantiles of an already sorted slice at each of `probs`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn compute_quantiles_sorted(sorted: &[f64], probs: &[f64]) -> Vec<f64> {
    assert!(!sorted.is_empty(), "Cannot compute quantiles of empty slice");
    probs
        .iter()
        .map(|&p| {
            let (floor_idx, ceil_idx) = type2_indices(sorted.len(), p.clamp(0.0, 1.0));
            (sorted[floor_idx] + sorted[ceil_idx]) / 2.0
        })
        .collect()
}
