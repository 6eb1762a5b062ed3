//! Statistical helpers for the null validator.
//!
//! - Counter-based sub-seeding for order-independent parallel sampling
//! - One-sided empirical p-values and Holm step-down correction
//! - Type 2 quantiles for summarising null distributions

mod pvalue;
mod quantile;
mod seed;

pub use pvalue::{empirical_p_value, holm_adjust};
pub use quantile::{compute_quantiles_sorted, NULL_SUMMARY_PROBS};
pub use seed::counter_rng_seed;
