//! Propagation Engine: wheels plus ciphertext to derived plaintext.
//!
//! Reads nothing but the ciphertext and the wheels. A position whose slot
//! residue is unforced stays [`Cell::Undetermined`].

use tracing::debug;

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::types::{Cell, CipherText, DerivedPlaintext};
use crate::wheel::WheelSet;

/// Derive plaintext for every position.
///
/// Fails if `classifier` is not the one `wheels` was built with, if the
/// lengths differ, or if the classifier routes a position to a missing wheel.
pub fn derive(
    ciphertext: &CipherText,
    wheels: &WheelSet,
    classifier: &dyn Classifier,
) -> Result<DerivedPlaintext> {
    wheels.check_classifier(classifier)?;
    if ciphertext.len() != wheels.len() {
        return Err(Error::LengthMismatch {
            expected: wheels.len(),
            found: ciphertext.len(),
        });
    }

    let mut plaintext = DerivedPlaintext::undetermined(ciphertext.len());
    for (position, &c) in ciphertext.letters().iter().enumerate() {
        let (_, wheel) = wheels.route(classifier, position)?;
        if let Some(residue) = wheel.residue_at(position) {
            plaintext.set(position, Cell::Resolved(wheel.family.decrypt(c, residue)));
        }
    }

    debug!(
        resolved = plaintext.resolved_count(),
        len = plaintext.len(),
        "propagation finished"
    );
    Ok(plaintext)
}

/// Derive plaintext and demand that every position is resolved.
pub fn derive_complete(
    ciphertext: &CipherText,
    wheels: &WheelSet,
    classifier: &dyn Classifier,
) -> Result<DerivedPlaintext> {
    let plaintext = derive(ciphertext, wheels, classifier)?;
    if !plaintext.is_fully_resolved() {
        return Err(Error::IncompleteDerivation {
            undetermined: plaintext.undetermined_positions(),
        });
    }
    Ok(plaintext)
}

/// Re-encrypt a plaintext under `wheels`.
///
/// Returns one entry per position; `None` where the plaintext cell is
/// undetermined or the slot residue is unforced.
pub fn encrypt(
    plaintext: &DerivedPlaintext,
    wheels: &WheelSet,
    classifier: &dyn Classifier,
) -> Result<Vec<Option<u8>>> {
    wheels.check_classifier(classifier)?;
    if plaintext.len() != wheels.len() {
        return Err(Error::LengthMismatch {
            expected: wheels.len(),
            found: plaintext.len(),
        });
    }
    plaintext
        .cells()
        .iter()
        .enumerate()
        .map(|(position, cell)| {
            let (_, wheel) = wheels.route(classifier, position)?;
            Ok(cell
                .letter()
                .zip(wheel.residue_at(position))
                .map(|(p, k)| wheel.family.encrypt(p, k)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierFormula;
    use crate::family::Family;
    use crate::wheel::{SlotPolicy, Wheel};

    fn tiny_wheels() -> WheelSet {
        // one class, period 2: slot 0 forced to 1, slot 1 unforced
        let mut wheel = Wheel::new(0, Family::Vigenere, 2, 0);
        wheel.force(0, 1, "T", SlotPolicy::Distinct);
        WheelSet::new("mod(1)", 4, vec![wheel])
    }

    #[test]
    fn test_derive_marks_unforced_slots() {
        let ct = CipherText::parse("BCDE").unwrap();
        let pt = derive(&ct, &tiny_wheels(), &ClassifierFormula::Modulo { modulus: 1 }).unwrap();
        assert_eq!(pt.to_string(), "A?C?");
    }

    #[test]
    fn test_derive_complete_reports_gaps() {
        let ct = CipherText::parse("BCDE").unwrap();
        let err = derive_complete(&ct, &tiny_wheels(), &ClassifierFormula::Modulo { modulus: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            Error::IncompleteDerivation {
                undetermined: vec![1, 3]
            }
        );
    }

    #[test]
    fn test_derive_rejects_foreign_classifier() {
        let ct = CipherText::parse("BCDE").unwrap();
        let err = derive(&ct, &tiny_wheels(), &ClassifierFormula::Modulo { modulus: 2 })
            .unwrap_err();
        assert!(matches!(err, Error::ClassifierMismatch { .. }));
    }

    #[test]
    fn test_encrypt_inverts_derive() {
        let ct = CipherText::parse("BCDE").unwrap();
        let classifier = ClassifierFormula::Modulo { modulus: 1 };
        let pt = derive(&ct, &tiny_wheels(), &classifier).unwrap();
        let back = encrypt(&pt, &tiny_wheels(), &classifier).unwrap();
        assert_eq!(back, vec![Some(1), None, Some(3), None]);
    }
}
