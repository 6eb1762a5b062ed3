//! Empirical p-values and Holm step-down adjustment.

/// One-sided empirical p-value of `observed` against a null sample.
///
/// `p = (#{null >= observed} + 1) / (N + 1)`, which lies in `(0, 1]` for any
/// sample, including an empty one.
pub fn empirical_p_value(null: &[f64], observed: f64) -> f64 {
    let exceed = null.iter().filter(|&&v| v >= observed).count();
    (exceed + 1) as f64 / (null.len() + 1) as f64
}

/// Holm step-down adjustment, returned in input order.
///
/// Sort ascending, multiply the i-th (1-based) raw p-value by `m - i + 1`,
/// carry the running maximum forward and cap at 1. Ties keep input order.
pub fn holm_adjust(raw: &[f64]) -> Vec<f64> {
    let m = raw.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| raw[a].total_cmp(&raw[b]));

    let mut adjusted = vec![0.0; m];
    let mut running = 0.0_f64;
    for (rank, &idx) in order.iter().enumerate() {
        let scaled = (raw[idx] * (m - rank) as f64).min(1.0);
        running = running.max(scaled);
        adjusted[idx] = running;
    }
    adjusted
}
