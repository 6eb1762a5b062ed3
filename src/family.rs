//! Periodic-substitution families.
//!
//! Three relations between plaintext `p`, key residue `k` and ciphertext `c`
//! (all mod 26):
//!
//! | Family | Encrypt | Decrypt | Residue from a crib |
//! |---|---|---|---|
//! | [`Family::Vigenere`] (Additive-A) | `c = p + k` | `p = c - k` | `k = c - p` |
//! | [`Family::VariantBeaufort`] (Additive-B) | `c = p - k` | `p = c + k` | `k = p - c` |
//! | [`Family::Beaufort`] (Subtractive) | `c = k - p` | `p = k - c` | `k = c + p` |
//!
//! Under both additive families a zero residue leaves the letter unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ALPHABET_LEN;

const M: u8 = ALPHABET_LEN;

fn add(a: u8, b: u8) -> u8 {
    (a % M + b % M) % M
}

fn sub(a: u8, b: u8) -> u8 {
    (a % M + M - b % M) % M
}

/// Cipher family of one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    /// Additive-A: key added to plaintext.
    Vigenere,
    /// Additive-B: key subtracted from plaintext.
    VariantBeaufort,
    /// Subtractive: plaintext subtracted from key.
    Beaufort,
}

impl Family {
    /// All families in default trial order.
    pub const ALL: [Family; 3] = [Family::Vigenere, Family::VariantBeaufort, Family::Beaufort];

    /// True for the two families where a zero residue is the identity.
    pub fn is_additive(self) -> bool {
        match self {
            Family::Vigenere | Family::VariantBeaufort => true,
            Family::Beaufort => false,
        }
    }

    /// Residue required so that `plaintext` encrypts to `ciphertext`.
    pub fn residue_for(self, ciphertext: u8, plaintext: u8) -> u8 {
        match self {
            Family::Vigenere => sub(ciphertext, plaintext),
            Family::VariantBeaufort => sub(plaintext, ciphertext),
            Family::Beaufort => add(ciphertext, plaintext),
        }
    }

    /// Plaintext letter for `ciphertext` under `residue`.
    pub fn decrypt(self, ciphertext: u8, residue: u8) -> u8 {
        match self {
            Family::Vigenere => sub(ciphertext, residue),
            Family::VariantBeaufort => add(ciphertext, residue),
            Family::Beaufort => sub(residue, ciphertext),
        }
    }

    /// Ciphertext letter for `plaintext` under `residue`.
    pub fn encrypt(self, plaintext: u8, residue: u8) -> u8 {
        match self {
            Family::Vigenere => add(plaintext, residue),
            Family::VariantBeaufort => sub(plaintext, residue),
            Family::Beaufort => sub(residue, plaintext),
        }
    }

    /// Short stable name used in skeleton descriptions.
    pub fn name(self) -> &'static str {
        match self {
            Family::Vigenere => "vigenere",
            Family::VariantBeaufort => "variant-beaufort",
            Family::Beaufort => "beaufort",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
