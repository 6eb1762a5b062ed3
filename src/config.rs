//! Solver, null-validator and gate configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GATE_ALPHA, DEFAULT_MASTER_SEED, DEFAULT_NULL_SAMPLES, DEFAULT_PERIOD_MAX,
    DEFAULT_PERIOD_MIN,
};
use crate::family::Family;
use crate::wheel::SlotPolicy;

/// Configuration options for [`crate::Solver`].
///
/// Builder methods assert their argument ranges; [`Config::validate`] reports
/// the same checks for configurations assembled field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // =========================================================================
    // Wheel search
    // =========================================================================
    /// Smallest period searched. Default: 10.
    pub period_min: usize,

    /// Largest period searched, inclusive. Default: 22.
    pub period_max: usize,

    /// Families tried for every class, in order.
    ///
    /// Default: Vigenere, Variant Beaufort, Beaufort.
    pub families: Vec<Family>,

    /// Per-class family lists that replace [`Config::families`] for that class.
    pub class_families: BTreeMap<usize, Vec<Family>>,

    /// Whether anchors of one class may share a slot.
    ///
    /// Default: [`SlotPolicy::Distinct`].
    pub slot_policy: SlotPolicy,

    /// Fail derivation when any position stays undetermined. Default: false.
    pub require_full_resolution: bool,

    // =========================================================================
    // Null validation
    // =========================================================================
    /// Number of null samples per batch. Default: 10,000.
    pub null_samples: usize,

    /// Master seed; sample `i` uses `counter_rng_seed(master_seed, i)`.
    pub master_seed: u64,

    /// Pre-registered threshold on Holm-adjusted p-values. Default: 0.01.
    ///
    /// A metric passes only when its adjusted p-value is strictly below it.
    pub gate_alpha: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period_min: DEFAULT_PERIOD_MIN,
            period_max: DEFAULT_PERIOD_MAX,
            families: Family::ALL.to_vec(),
            class_families: BTreeMap::new(),
            slot_policy: SlotPolicy::Distinct,
            require_full_resolution: false,

            null_samples: DEFAULT_NULL_SAMPLES,
            master_seed: DEFAULT_MASTER_SEED,
            gate_alpha: DEFAULT_GATE_ALPHA,
        }
    }
}

impl Config {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference settings: periods 10..=22, all three families, 10,000 nulls.
    pub fn reference() -> Self {
        Self::default()
    }

    /// Quick configuration for development: 1,000 null samples.
    pub fn quick() -> Self {
        Self {
            null_samples: 1_000,
            ..Default::default()
        }
    }

    /// Thorough configuration: 100,000 null samples.
    pub fn thorough() -> Self {
        Self {
            null_samples: 100_000,
            ..Default::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the inclusive period search range.
    pub fn period_range(mut self, min: usize, max: usize) -> Self {
        assert!(min >= 1, "period_min must be positive");
        assert!(min <= max, "period_min must be <= period_max");
        self.period_min = min;
        self.period_max = max;
        self
    }

    /// Set the family trial order for every class.
    pub fn families(mut self, families: Vec<Family>) -> Self {
        assert!(!families.is_empty(), "families must not be empty");
        self.families = families;
        self
    }

    /// Override the family trial order for one class.
    pub fn class_families(mut self, class: usize, families: Vec<Family>) -> Self {
        assert!(!families.is_empty(), "class families must not be empty");
        self.class_families.insert(class, families);
        self
    }

    /// Set the slot-sharing policy.
    pub fn slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.slot_policy = policy;
        self
    }

    /// Demand a fully resolved derivation.
    pub fn require_full_resolution(mut self, require: bool) -> Self {
        self.require_full_resolution = require;
        self
    }

    /// Set the null sample count.
    pub fn null_samples(mut self, n: usize) -> Self {
        assert!(n > 0, "null_samples must be positive");
        self.null_samples = n;
        self
    }

    /// Set the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.master_seed = seed;
        self
    }

    /// Set the gate threshold.
    pub fn gate_alpha(mut self, alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "gate_alpha must be in (0, 1)");
        self.gate_alpha = alpha;
        self
    }

    // =========================================================================
    // Resolution methods
    // =========================================================================

    /// Families to try for `class`.
    pub fn families_for(&self, class: usize) -> &[Family] {
        self.class_families
            .get(&class)
            .map_or(self.families.as_slice(), Vec::as_slice)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.period_min == 0 {
            return Err("period_min must be positive".to_string());
        }
        if self.period_min > self.period_max {
            return Err("period_min must be <= period_max".to_string());
        }
        if self.families.is_empty() {
            return Err("families must not be empty".to_string());
        }
        if let Some((class, _)) = self.class_families.iter().find(|(_, f)| f.is_empty()) {
            return Err(format!("class {class} has an empty family list"));
        }
        if self.null_samples == 0 {
            return Err("null_samples must be positive".to_string());
        }
        if !(self.gate_alpha > 0.0 && self.gate_alpha < 1.0) {
            return Err("gate_alpha must be in (0, 1)".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!((config.period_min, config.period_max), (10, 22));
        assert_eq!(config.families, Family::ALL.to_vec());
        assert_eq!(config.slot_policy, SlotPolicy::Distinct);
        assert_eq!(config.null_samples, 10_000);
        assert_eq!(config.gate_alpha, 0.01);
        assert_eq!(config, Config::reference());
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(Config::quick().null_samples, 1_000);
        assert_eq!(Config::thorough().null_samples, 100_000);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new()
            .period_range(4, 8)
            .families(vec![Family::Beaufort])
            .class_families(2, vec![Family::Vigenere])
            .null_samples(50)
            .seed(7)
            .gate_alpha(0.05);

        assert_eq!((config.period_min, config.period_max), (4, 8));
        assert_eq!(config.families_for(0), &[Family::Beaufort]);
        assert_eq!(config.families_for(2), &[Family::Vigenere]);
        assert_eq!(config.master_seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut invalid = Config::default();
        invalid.period_min = 30;
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.families.clear();
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.gate_alpha = 1.0;
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.class_families.insert(3, Vec::new());
        assert_eq!(
            invalid.validate(),
            Err("class 3 has an empty family list".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "period_min must be <= period_max")]
    fn test_inverted_period_range_panics() {
        let _ = Config::new().period_range(12, 11);
    }
}
