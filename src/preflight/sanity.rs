//! Input sanity checks.
//!
//! None of these stop a solve. They flag inputs that will predictably shape
//! the outcome: a ciphertext that is not the pinned one, crib letters equal to
//! their ciphertext letters (a zero residue under both additive families, so
//! Option-A will reject them), and classes no anchor reaches.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::types::{letter_char, AnchorCrib, CipherText, Digest};

/// Warning from the input checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SanityWarning {
    /// The ciphertext digest differs from the pinned one.
    ///
    /// Critical: every downstream result would describe a different text.
    CiphertextDigestMismatch {
        /// Pinned digest.
        expected: Digest,
        /// Digest of the supplied ciphertext.
        actual: Digest,
    },

    /// A crib letter equals its ciphertext letter.
    CribMatchesCiphertext {
        /// Crib label.
        label: String,
        /// Position.
        position: usize,
        /// The shared letter.
        letter: char,
    },

    /// No anchor covers any position of this class, so its wheel stays unforced.
    UncoveredClass {
        /// Class index.
        class: usize,
    },

    /// The classifier assigns no position to this class.
    EmptyClass {
        /// Class index.
        class: usize,
    },
}

impl SanityWarning {
    /// Check if this warning indicates a critical issue.
    pub fn is_critical(&self) -> bool {
        matches!(self, SanityWarning::CiphertextDigestMismatch { .. })
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            SanityWarning::CiphertextDigestMismatch { expected, actual } => format!(
                "CRITICAL: ciphertext digest {actual} does not match pinned digest {expected}."
            ),
            SanityWarning::CribMatchesCiphertext {
                label,
                position,
                letter,
            } => format!(
                "Crib {label} puts {letter} over ciphertext {letter} at position {position}; \
                 additive families will be rejected for its class."
            ),
            SanityWarning::UncoveredClass { class } => {
                format!("No anchor covers class {class}; its positions stay undetermined.")
            }
            SanityWarning::EmptyClass { class } => {
                format!("Class {class} contains no positions.")
            }
        }
    }
}

/// Compare the ciphertext against a pinned digest.
pub fn digest_check(ciphertext: &CipherText, expected: &Digest) -> Option<SanityWarning> {
    let actual = ciphertext.digest();
    (actual != *expected).then_some(SanityWarning::CiphertextDigestMismatch {
        expected: *expected,
        actual,
    })
}

/// Crib letters that equal their ciphertext letters.
///
/// Cribs that do not fit the ciphertext are skipped; the solver reports those.
pub fn identity_check(ciphertext: &CipherText, cribs: &[AnchorCrib]) -> Vec<SanityWarning> {
    cribs
        .iter()
        .filter(|c| c.validate(ciphertext.len()).is_ok())
        .flat_map(|crib| {
            crib.points()
                .filter(|&(position, letter)| ciphertext.letter(position) == letter)
                .map(|(position, letter)| SanityWarning::CribMatchesCiphertext {
                    label: crib.label.clone(),
                    position,
                    letter: letter_char(letter),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Classes with no positions, then classes with no anchor coverage.
pub fn coverage_check(
    len: usize,
    cribs: &[AnchorCrib],
    classifier: &dyn Classifier,
) -> Vec<SanityWarning> {
    let classes = classifier.num_classes();
    let populated: BTreeSet<usize> = (0..len).map(|p| classifier.classify(p)).collect();
    let covered: BTreeSet<usize> = cribs
        .iter()
        .filter(|c| c.validate(len).is_ok())
        .flat_map(|c| c.start..=c.end)
        .map(|p| classifier.classify(p))
        .collect();

    let empty = (0..classes)
        .filter(|c| !populated.contains(c))
        .map(|class| SanityWarning::EmptyClass { class });
    let uncovered = (0..classes)
        .filter(|c| populated.contains(c) && !covered.contains(c))
        .map(|class| SanityWarning::UncoveredClass { class });
    empty.chain(uncovered).collect()
}
