//! Tests for configuration validation.
//!
//! Builder methods reject out-of-range values with a panic; `validate()`
//! reports the same problems for configurations assembled field by field.

use anchor_wheel::{Config, Family, Solver};

// =============================================================================
// PERIOD RANGE
// =============================================================================

#[test]
#[should_panic(expected = "period_min must be positive")]
fn period_min_zero_panics() {
    let _ = Solver::new().period_range(0, 5);
}

#[test]
#[should_panic(expected = "period_min must be <= period_max")]
fn period_range_reversed_panics() {
    let _ = Solver::new().period_range(12, 10);
}

#[test]
fn period_range_single_value_valid() {
    let solver = Solver::new().period_range(7, 7);
    assert_eq!((solver.config().period_min, solver.config().period_max), (7, 7));
}

// =============================================================================
// FAMILIES
// =============================================================================

#[test]
#[should_panic(expected = "families must not be empty")]
fn empty_families_panics() {
    let _ = Solver::new().families(Vec::new());
}

#[test]
fn empty_class_override_is_invalid() {
    let mut config = Config::new();
    config.class_families.insert(3, Vec::new());
    assert_eq!(
        config.validate(),
        Err("class 3 has an empty family list".to_string())
    );
}

#[test]
fn class_override_replaces_default_order() {
    let config = Config::new().class_families(2, vec![Family::Beaufort]);
    assert_eq!(config.families_for(2), &[Family::Beaufort]);
    assert_eq!(config.families_for(0), &Family::ALL);
}

// =============================================================================
// NULL SAMPLES AND ALPHA
// =============================================================================

#[test]
#[should_panic(expected = "null_samples must be positive")]
fn null_samples_zero_panics() {
    let _ = Solver::new().null_samples(0);
}

#[test]
#[should_panic(expected = "gate_alpha must be in (0, 1)")]
fn alpha_zero_panics() {
    let _ = Solver::new().gate_alpha(0.0);
}

#[test]
#[should_panic(expected = "gate_alpha must be in (0, 1)")]
fn alpha_one_panics() {
    let _ = Solver::new().gate_alpha(1.0);
}

#[test]
#[should_panic(expected = "gate_alpha must be in (0, 1)")]
fn alpha_nan_panics() {
    let _ = Solver::new().gate_alpha(f64::NAN);
}

#[test]
fn alpha_default_valid() {
    assert_eq!(Solver::new().config().gate_alpha, 0.01);
}

// =============================================================================
// PRESETS
// =============================================================================

#[test]
fn presets_validate() {
    for config in [Config::new(), Config::reference(), Config::quick(), Config::thorough()] {
        assert!(config.validate().is_ok());
    }
    assert_eq!(Solver::quick().config().null_samples, 1_000);
    assert_eq!(Solver::thorough().config().null_samples, 100_000);
}

#[test]
fn invalid_config_fails_solve() {
    let mut config = Config::new();
    config.gate_alpha = 2.0;
    let solver = Solver::with_config(config);
    let result = solver.solve(
        &anchor_wheel::CipherText::reference(),
        &anchor_wheel::AnchorCrib::reference_set(),
    );
    assert!(matches!(result, Err(anchor_wheel::Error::InvalidConfig { .. })));
}
