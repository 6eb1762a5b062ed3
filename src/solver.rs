//! Main `Solver` entry point and builder.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{
    build_wheels, derive, derive_complete, run_gate, verify, FalsificationHarness, GateDecision,
    VerificationReport,
};
use crate::classifier::{Classifier, ClassifierFormula};
use crate::config::Config;
use crate::error::Result;
use crate::family::Family;
use crate::preflight::{run_all_checks, PreflightResult};
use crate::result::SolveOutcome;
use crate::scoring::Metric;
use crate::types::{AnchorCrib, CipherText, DerivedPlaintext, Digest};
use crate::wheel::{CribForcing, SlotPolicy, WheelSet};

/// Everything one end-to-end run produced.
///
/// Later stages are `None` when an earlier one could not feed them: no
/// plaintext without feasible wheels, no gate without metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverReport {
    /// Input warnings.
    pub preflight: PreflightResult,
    /// Per-class build outcome.
    pub outcome: SolveOutcome,
    /// Accepted wheels.
    pub wheels: Option<WheelSet>,
    /// Derived plaintext.
    pub plaintext: Option<DerivedPlaintext>,
    /// Round-trip and digest checks of the derived plaintext.
    pub verification: Option<VerificationReport>,
    /// Null-validation decision.
    pub gate: Option<GateDecision>,
}

/// Anchor-constrained solver.
///
/// Use the builder methods to configure, then call the pipeline stages
/// individually or [`Solver::run`] for all of them.
///
/// # Example
///
/// ```
/// use anchor_wheel::{AnchorCrib, CipherText, Solver};
///
/// let solver = Solver::new();
/// let ct = CipherText::reference();
/// let outcome = solver.solve(&ct, &AnchorCrib::reference_set()).unwrap();
/// assert!(outcome.is_feasible());
/// ```
#[derive(Clone)]
pub struct Solver {
    config: Config,
    classifier: Arc<dyn Classifier>,
    ciphertext_digest: Option<Digest>,
    plaintext_digest: Option<Digest>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("config", &self.config)
            .field("classifier", &self.classifier.name())
            .field("ciphertext_digest", &self.ciphertext_digest)
            .field("plaintext_digest", &self.plaintext_digest)
            .finish()
    }
}

impl Solver {
    /// Reference classifier and default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Reference classifier with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            classifier: Arc::new(ClassifierFormula::reference()),
            ciphertext_digest: None,
            plaintext_digest: None,
        }
    }

    /// Quick preset (1,000 null samples).
    pub fn quick() -> Self {
        Self::with_config(Config::quick())
    }

    /// Thorough preset (100,000 null samples).
    pub fn thorough() -> Self {
        Self::with_config(Config::thorough())
    }

    /// Replace the classifier.
    pub fn classifier<C: Classifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Set the inclusive period search range.
    pub fn period_range(mut self, min: usize, max: usize) -> Self {
        self.config = self.config.period_range(min, max);
        self
    }

    /// Set the family trial order.
    pub fn families(mut self, families: Vec<Family>) -> Self {
        self.config = self.config.families(families);
        self
    }

    /// Set the slot-sharing policy.
    pub fn slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.config = self.config.slot_policy(policy);
        self
    }

    /// Demand fully resolved derivations.
    pub fn require_full_resolution(mut self, require: bool) -> Self {
        self.config = self.config.require_full_resolution(require);
        self
    }

    /// Set the null sample count.
    pub fn null_samples(mut self, n: usize) -> Self {
        self.config = self.config.null_samples(n);
        self
    }

    /// Set the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.seed(seed);
        self
    }

    /// Set the gate threshold.
    pub fn gate_alpha(mut self, alpha: f64) -> Self {
        self.config = self.config.gate_alpha(alpha);
        self
    }

    /// Pin the ciphertext content digest checked during preflight.
    pub fn ciphertext_digest(mut self, digest: Digest) -> Self {
        self.ciphertext_digest = Some(digest);
        self
    }

    /// Pin the expected plaintext digest checked during verification.
    pub fn expected_digest(mut self, digest: Digest) -> Self {
        self.plaintext_digest = Some(digest);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the classifier.
    pub fn classifier_ref(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Run the input checks.
    pub fn preflight(&self, ciphertext: &CipherText, cribs: &[AnchorCrib]) -> PreflightResult {
        run_all_checks(
            ciphertext,
            cribs,
            self.classifier.as_ref(),
            self.ciphertext_digest.as_ref(),
        )
    }

    /// Build one wheel per class.
    pub fn solve(&self, ciphertext: &CipherText, cribs: &[AnchorCrib]) -> Result<SolveOutcome> {
        build_wheels(ciphertext, cribs, self.classifier.as_ref(), &self.config)
    }

    /// Derive plaintext, failing on gaps when full resolution is required.
    pub fn derive(&self, ciphertext: &CipherText, wheels: &WheelSet) -> Result<DerivedPlaintext> {
        if self.config.require_full_resolution {
            derive_complete(ciphertext, wheels, self.classifier.as_ref())
        } else {
            derive(ciphertext, wheels, self.classifier.as_ref())
        }
    }

    /// Force an additional crib into accepted wheels, skeleton pinned.
    pub fn extend(
        &self,
        ciphertext: &CipherText,
        wheels: &mut WheelSet,
        crib: &AnchorCrib,
    ) -> Result<CribForcing> {
        wheels.force_crib(ciphertext, crib, self.classifier.as_ref())
    }

    /// Verify a candidate against the pinned plaintext digest.
    pub fn verify(
        &self,
        ciphertext: &CipherText,
        wheels: &WheelSet,
        plaintext: &DerivedPlaintext,
    ) -> Result<VerificationReport> {
        verify(
            ciphertext,
            wheels,
            self.classifier.as_ref(),
            plaintext,
            self.plaintext_digest.as_ref(),
        )
    }

    /// Null-validate a candidate.
    pub fn validate(
        &self,
        ciphertext: &CipherText,
        wheels: &WheelSet,
        candidate: &DerivedPlaintext,
        metrics: &[&dyn Metric],
    ) -> Result<GateDecision> {
        run_gate(
            ciphertext,
            wheels,
            self.classifier.as_ref(),
            candidate,
            metrics,
            &self.config,
        )
    }

    /// Falsification harness over the same classifier, configuration and
    /// pinned plaintext digest.
    pub fn falsification(
        &self,
        ciphertext: &CipherText,
        anchors: &[AnchorCrib],
    ) -> Result<FalsificationHarness> {
        let harness = FalsificationHarness::new(
            ciphertext.clone(),
            anchors.to_vec(),
            Arc::clone(&self.classifier),
            self.config.clone(),
        )?;
        Ok(match self.plaintext_digest {
            Some(d) => harness.with_expected_digest(d),
            None => harness,
        })
    }

    /// Preflight, solve, derive, verify and (with metrics) validate.
    pub fn run(
        &self,
        ciphertext: &CipherText,
        cribs: &[AnchorCrib],
        metrics: &[&dyn Metric],
    ) -> Result<SolverReport> {
        let preflight = self.preflight(ciphertext, cribs);
        let outcome = self.solve(ciphertext, cribs)?;
        let wheels = outcome.wheel_set();

        let (plaintext, verification, gate) = match &wheels {
            Some(w) => {
                let plaintext = self.derive(ciphertext, w)?;
                let verification = self.verify(ciphertext, w, &plaintext)?;
                let gate = if metrics.is_empty() {
                    None
                } else {
                    Some(self.validate(ciphertext, w, &plaintext, metrics)?)
                };
                (Some(plaintext), Some(verification), gate)
            }
            None => (None, None, None),
        };

        info!(
            feasible = outcome.is_feasible(),
            resolved = plaintext.as_ref().map(DerivedPlaintext::resolved_count),
            accepted = verification.as_ref().map(VerificationReport::accepted),
            gate_passed = gate.as_ref().map(|g| g.passed),
            "solver run finished"
        );
        Ok(SolverReport {
            preflight,
            outcome,
            wheels,
            plaintext,
            verification,
            gate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_delegates_to_config() {
        let solver = Solver::new()
            .period_range(5, 9)
            .null_samples(20)
            .seed(3)
            .gate_alpha(0.05)
            .slot_policy(SlotPolicy::Consistent);
        let config = solver.config();
        assert_eq!((config.period_min, config.period_max), (5, 9));
        assert_eq!(config.null_samples, 20);
        assert_eq!(config.master_seed, 3);
        assert_eq!(config.slot_policy, SlotPolicy::Consistent);
    }

    #[test]
    fn test_classifier_replacement() {
        let solver = Solver::new().classifier(ClassifierFormula::Modulo { modulus: 3 });
        assert_eq!(solver.classifier_ref().name(), "mod(3)");
        assert!(format!("{solver:?}").contains("mod(3)"));
    }

    #[test]
    fn test_require_full_resolution_rejects_reference_gaps() {
        let solver = Solver::new().require_full_resolution(true);
        let ct = CipherText::reference();
        let wheels = solver
            .solve(&ct, &AnchorCrib::reference_set())
            .unwrap()
            .wheel_set()
            .unwrap();
        assert!(matches!(
            solver.derive(&ct, &wheels),
            Err(crate::Error::IncompleteDerivation { ref undetermined }) if undetermined.len() == 26
        ));
    }
}
