//! Round-Trip Verifier.
//!
//! Re-encrypts a candidate plaintext under the wheels that produced it and
//! compares letter-for-letter with the ciphertext, then compares the
//! plaintext digest against a pinned value. Both checks must pass before a
//! derivation is accepted.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::propagate::encrypt;
use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::types::{letter_char, CipherText, DerivedPlaintext, Digest};
use crate::wheel::WheelSet;

/// A position whose re-encryption differs from the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMismatch {
    /// Position.
    pub position: usize,
    /// Ciphertext letter value.
    pub expected: u8,
    /// Re-encrypted letter value.
    pub found: u8,
}

/// Outcome of one verification. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Every position re-encrypted to its ciphertext letter.
    pub round_trip_ok: bool,
    /// The plaintext digest equals the pinned one.
    ///
    /// False when no digest was pinned or the plaintext is incomplete.
    pub digest_match: bool,
    /// The candidate had no undetermined cells.
    pub fully_resolved: bool,
    /// Positions that re-encrypted to the wrong letter.
    pub mismatches: Vec<PositionMismatch>,
    /// Positions that could not be re-encrypted: undetermined cell or
    /// unforced slot.
    pub unresolved: Vec<usize>,
    /// Digest of the candidate, if fully resolved.
    pub digest: Option<Digest>,
    /// Digest the caller pinned.
    pub expected_digest: Option<Digest>,
}

impl VerificationReport {
    /// True when both checks passed.
    pub fn accepted(&self) -> bool {
        self.fully_resolved && self.round_trip_ok && self.digest_match
    }

    /// Convert the report into a publish decision.
    ///
    /// Reports the first failing check: incomplete derivation, then round
    /// trip, then digest.
    pub fn require_accepted(&self) -> Result<()> {
        if !self.fully_resolved {
            return Err(Error::IncompleteDerivation {
                undetermined: self.unresolved.clone(),
            });
        }
        if !self.round_trip_ok {
            let mut positions: Vec<usize> =
                self.mismatches.iter().map(|m| m.position).collect();
            positions.extend(&self.unresolved);
            positions.sort_unstable();
            return Err(Error::RoundTripMismatch { positions });
        }
        if !self.digest_match {
            return Err(Error::DigestMismatch {
                expected: self.expected_digest.map(|d| d.to_hex()).unwrap_or_default(),
                actual: self.digest.map(|d| d.to_hex()).unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Verify `plaintext` against `ciphertext` under `wheels`.
///
/// Structural problems (wrong classifier, length mismatch) are `Err`; failed
/// checks are recorded in the report.
pub fn verify(
    ciphertext: &CipherText,
    wheels: &WheelSet,
    classifier: &dyn Classifier,
    plaintext: &DerivedPlaintext,
    expected_digest: Option<&Digest>,
) -> Result<VerificationReport> {
    if ciphertext.len() != plaintext.len() {
        return Err(Error::LengthMismatch {
            expected: ciphertext.len(),
            found: plaintext.len(),
        });
    }
    let reencrypted = encrypt(plaintext, wheels, classifier)?;

    let mut mismatches = Vec::new();
    let mut unresolved = Vec::new();
    for (position, (&expected, found)) in ciphertext.letters().iter().zip(&reencrypted).enumerate()
    {
        match *found {
            None => unresolved.push(position),
            Some(found) if found != expected => mismatches.push(PositionMismatch {
                position,
                expected,
                found,
            }),
            Some(_) => {}
        }
    }

    let fully_resolved = plaintext.is_fully_resolved();
    let round_trip_ok = unresolved.is_empty() && mismatches.is_empty();
    let digest = plaintext.digest();
    let digest_match = matches!((digest, expected_digest), (Some(d), Some(e)) if d == *e);

    let report = VerificationReport {
        round_trip_ok,
        digest_match,
        fully_resolved,
        mismatches,
        unresolved,
        digest,
        expected_digest: expected_digest.copied(),
    };

    if report.accepted() {
        info!(digest = ?report.digest, "derivation verified");
    } else {
        warn!(
            round_trip_ok,
            digest_match,
            fully_resolved,
            mismatches = report.mismatches.len(),
            unresolved = report.unresolved.len(),
            first_mismatch = ?report.mismatches.first().map(|m| (m.position, letter_char(m.expected), letter_char(m.found))),
            "derivation rejected"
        );
    }
    Ok(report)
}
