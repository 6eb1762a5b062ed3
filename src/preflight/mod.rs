//! Preflight checks on solver inputs.
//!
//! Warnings are informational; only a critical one marks the inputs invalid,
//! and even then nothing is refused here.

mod sanity;

pub use sanity::{coverage_check, digest_check, identity_check, SanityWarning};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::Classifier;
use crate::types::{AnchorCrib, CipherText, Digest};

/// Result of running all preflight checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightResult {
    /// Warnings in check order: digest, identity letters, coverage.
    pub warnings: Vec<SanityWarning>,
    /// False if any warning is critical.
    pub is_valid: bool,
}

impl PreflightResult {
    /// True if there are no warnings at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Run every check and log each warning.
pub fn run_all_checks(
    ciphertext: &CipherText,
    cribs: &[AnchorCrib],
    classifier: &dyn Classifier,
    expected_digest: Option<&Digest>,
) -> PreflightResult {
    let mut warnings = Vec::new();
    if let Some(expected) = expected_digest {
        warnings.extend(digest_check(ciphertext, expected));
    }
    warnings.extend(identity_check(ciphertext, cribs));
    warnings.extend(coverage_check(ciphertext.len(), cribs, classifier));

    for w in &warnings {
        warn!(critical = w.is_critical(), "{}", w.description());
    }
    let is_valid = !warnings.iter().any(SanityWarning::is_critical);
    PreflightResult { warnings, is_valid }
}
