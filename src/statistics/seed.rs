//! Counter-based sub-seeding.
//!
//! Each work unit derives its own seed from `(master, index)` so results do not
//! depend on which worker ran which unit or in what order.

/// Derive the seed for work unit `index` from a master seed.
///
/// SplitMix64 finaliser over the master seed advanced by `index` golden-ratio
/// steps, so neighbouring indices land far apart in seed space.
#[inline]
pub fn counter_rng_seed(master: u64, index: u64) -> u64 {
    let mut z = master.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
