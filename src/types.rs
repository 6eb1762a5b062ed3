//! Core data types: letters, ciphertext, cribs and derived plaintext.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::constants::{ALPHABET, ALPHABET_LEN};
use crate::error::{Error, Result};

/// Letter value of an uppercase ASCII character (`A` = 0).
pub fn letter_value(ch: char) -> Option<u8> {
    if ch.is_ascii_uppercase() {
        Some(ch as u8 - b'A')
    } else {
        None
    }
}

/// Uppercase character for a letter value. Values are reduced mod 26.
pub fn letter_char(value: u8) -> char {
    ALPHABET[(value % ALPHABET_LEN) as usize] as char
}

/// Parse an uppercase string into letter values.
pub fn parse_letters(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .enumerate()
        .map(|(position, found)| {
            letter_value(found).ok_or(Error::InvalidLetter { position, found })
        })
        .collect()
}

fn render(letters: &[u8]) -> String {
    letters.iter().map(|&v| letter_char(v)).collect()
}

// ============================================================================
// Digest
// ============================================================================

/// SHA-256 digest, exchanged as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest([u8; 32]);

impl Digest {
    /// Digest of a letter sequence rendered as uppercase ASCII.
    pub fn of_letters(letters: &[u8]) -> Self {
        Self::of_text(&render(letters))
    }

    /// Digest of arbitrary text.
    pub fn of_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let out = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&out);
        Self(bytes)
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(value: &str) -> Result<Self> {
        let raw = hex::decode(value.trim()).map_err(|e| Error::InvalidDigest {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 32] = raw.try_into().map_err(|raw: Vec<u8>| Error::InvalidDigest {
            value: value.to_string(),
            reason: format!("expected 32 bytes, got {}", raw.len()),
        })?;
        Ok(Self(bytes))
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Digest::from_hex(&value)
    }
}

// ============================================================================
// CipherText
// ============================================================================

/// Immutable ciphertext letter sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherText {
    letters: Vec<u8>,
}

impl CipherText {
    /// Parse an uppercase ciphertext string.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            letters: parse_letters(text)?,
        })
    }

    /// Build from letter values (reduced mod 26).
    pub fn from_letters(letters: Vec<u8>) -> Self {
        Self {
            letters: letters.into_iter().map(|v| v % ALPHABET_LEN).collect(),
        }
    }

    /// The reference 97-letter ciphertext.
    pub fn reference() -> Self {
        Self::from_letters(
            crate::constants::REFERENCE_CIPHERTEXT
                .bytes()
                .map(|b| b - b'A')
                .collect(),
        )
    }

    /// Number of letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// True when there are no letters.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Letter value at `position`.
    pub fn letter(&self, position: usize) -> u8 {
        self.letters[position]
    }

    /// All letter values.
    pub fn letters(&self) -> &[u8] {
        &self.letters
    }

    /// Content digest.
    pub fn digest(&self) -> Digest {
        Digest::of_letters(&self.letters)
    }
}

impl fmt::Display for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.letters))
    }
}

// ============================================================================
// AnchorCrib
// ============================================================================

/// Known plaintext asserted at a fixed, inclusive span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorCrib {
    /// Human-readable label, used as the origin of forced residues.
    pub label: String,
    /// First covered position.
    pub start: usize,
    /// Last covered position (inclusive).
    pub end: usize,
    /// Uppercase plaintext occupying `start..=end`.
    pub plaintext: String,
}

impl AnchorCrib {
    /// Crib whose end is implied by the plaintext length.
    ///
    /// # Panics
    ///
    /// Panics if `plaintext` is empty.
    pub fn new(label: impl Into<String>, start: usize, plaintext: impl Into<String>) -> Self {
        let plaintext = plaintext.into();
        assert!(!plaintext.is_empty(), "crib plaintext must not be empty");
        Self {
            label: label.into(),
            start,
            end: start + plaintext.chars().count() - 1,
            plaintext,
        }
    }

    /// Crib with an explicit inclusive span. Checked by [`AnchorCrib::validate`].
    pub fn with_span(
        label: impl Into<String>,
        start: usize,
        end: usize,
        plaintext: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            plaintext: plaintext.into(),
        }
    }

    /// The four reference anchors.
    pub fn reference_set() -> Vec<Self> {
        crate::constants::REFERENCE_ANCHORS
            .iter()
            .map(|&(label, start, end, text)| Self::with_span(label, start, end, text))
            .collect()
    }

    /// Number of covered positions.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// Check the span against a ciphertext length and the plaintext.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.end < self.start || self.end >= len {
            return Err(Error::CribOutOfRange {
                label: self.label.clone(),
                start: self.start,
                end: self.end,
                len,
            });
        }
        let letters = self.plaintext.chars().count();
        if letters != self.width() {
            return Err(Error::CribLengthMismatch {
                label: self.label.clone(),
                span: self.width(),
                letters,
            });
        }
        parse_letters(&self.plaintext).map_err(|e| match e {
            Error::InvalidLetter { position, found } => Error::InvalidLetter {
                position: self.start + position,
                found,
            },
            other => other,
        })?;
        Ok(())
    }

    /// `(position, letter)` pairs. Call [`AnchorCrib::validate`] first.
    pub fn points(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.plaintext
            .chars()
            .enumerate()
            .filter_map(move |(i, ch)| letter_value(ch).map(|v| (self.start + i, v)))
    }

    /// Same crib translated by `delta`, or `None` if it would start before 0.
    pub fn shifted(&self, delta: isize) -> Option<Self> {
        let start = self.start.checked_add_signed(delta)?;
        let end = self.end.checked_add_signed(delta)?;
        Some(Self {
            label: self.label.clone(),
            start,
            end,
            plaintext: self.plaintext.clone(),
        })
    }
}

/// A single required plaintext letter and the crib demanding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Required plaintext letter.
    pub letter: u8,
    /// Label of the crib.
    pub origin: String,
}

/// Validate and merge cribs into a position-ordered requirement map.
///
/// Overlapping cribs are accepted only when they agree on every shared position.
pub fn merge_cribs(cribs: &[AnchorCrib], len: usize) -> Result<BTreeMap<usize, Requirement>> {
    let mut merged: BTreeMap<usize, Requirement> = BTreeMap::new();
    for crib in cribs {
        crib.validate(len)?;
        for (position, letter) in crib.points() {
            match merged.get(&position) {
                Some(existing) if existing.letter != letter => {
                    return Err(Error::CribConflict {
                        position,
                        first: existing.origin.clone(),
                        second: crib.label.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    merged.insert(
                        position,
                        Requirement {
                            letter,
                            origin: crib.label.clone(),
                        },
                    );
                }
            }
        }
    }
    Ok(merged)
}

// ============================================================================
// DerivedPlaintext
// ============================================================================

/// One derived plaintext cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Letter fixed by a forced residue.
    Resolved(u8),
    /// No residue available for this position's slot.
    Undetermined,
}

impl Cell {
    /// Letter value if resolved.
    pub fn letter(self) -> Option<u8> {
        match self {
            Cell::Resolved(v) => Some(v),
            Cell::Undetermined => None,
        }
    }
}

/// Plaintext produced by propagation; `?` marks undetermined cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedPlaintext {
    cells: Vec<Cell>,
}

impl DerivedPlaintext {
    /// A plaintext of `len` undetermined cells.
    pub fn undetermined(len: usize) -> Self {
        Self {
            cells: vec![Cell::Undetermined; len],
        }
    }

    /// Build from cells.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Parse a candidate plaintext; `?` is read as undetermined.
    pub fn parse(text: &str) -> Result<Self> {
        let cells = text
            .chars()
            .enumerate()
            .map(|(position, found)| match found {
                '?' => Ok(Cell::Undetermined),
                ch => letter_value(ch)
                    .map(Cell::Resolved)
                    .ok_or(Error::InvalidLetter { position, found }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { cells })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `position`.
    pub fn cell(&self, position: usize) -> Cell {
        self.cells[position]
    }

    /// All cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn set(&mut self, position: usize, cell: Cell) {
        self.cells[position] = cell;
    }

    /// True when no cell is undetermined.
    pub fn is_fully_resolved(&self) -> bool {
        self.cells.iter().all(|c| matches!(c, Cell::Resolved(_)))
    }

    /// Positions still undetermined, ascending.
    pub fn undetermined_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Cell::Undetermined))
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of resolved cells.
    pub fn resolved_count(&self) -> usize {
        self.cells.len() - self.undetermined_positions().len()
    }

    /// Letters of a fully resolved plaintext.
    pub fn letters(&self) -> Option<Vec<u8>> {
        self.cells.iter().map(|c| c.letter()).collect()
    }

    /// Rendered span `start..=end`, or `None` if any cell in it is undetermined.
    pub fn span(&self, start: usize, end: usize) -> Option<String> {
        self.cells
            .get(start..=end)?
            .iter()
            .map(|c| c.letter().map(letter_char))
            .collect()
    }

    /// Copy with one cell replaced by `letter`.
    pub fn with_letter(&self, position: usize, letter: u8) -> Self {
        let mut copy = self.clone();
        copy.cells[position] = Cell::Resolved(letter % ALPHABET_LEN);
        copy
    }

    /// Digest of a fully resolved plaintext.
    pub fn digest(&self) -> Option<Digest> {
        self.letters().map(|letters| Digest::of_letters(&letters))
    }
}

impl fmt::Display for DerivedPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self
            .cells
            .iter()
            .map(|c| c.letter().map(letter_char).unwrap_or('?'))
            .collect();
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ciphertext_length() {
        let ct = CipherText::reference();
        assert_eq!(ct.len(), 97);
        assert_eq!(ct.to_string(), crate::constants::REFERENCE_CIPHERTEXT);
    }

    #[test]
    fn test_reference_anchor_spans_fit_plaintext() {
        for crib in AnchorCrib::reference_set() {
            assert!(crib.validate(97).is_ok(), "{} should validate", crib.label);
        }
    }

    #[test]
    fn test_parse_rejects_lowercase() {
        let err = CipherText::parse("ABcD").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLetter {
                position: 2,
                found: 'c'
            }
        );
    }

    #[test]
    fn test_crib_length_mismatch() {
        let crib = AnchorCrib::with_span("X", 3, 5, "AB");
        assert!(matches!(
            crib.validate(10),
            Err(Error::CribLengthMismatch { span: 3, letters: 2, .. })
        ));
    }

    #[test]
    fn test_crib_out_of_range() {
        let crib = AnchorCrib::new("X", 8, "ABC");
        assert!(matches!(crib.validate(10), Err(Error::CribOutOfRange { .. })));
    }

    #[test]
    fn test_merge_accepts_agreeing_overlap() {
        let cribs = vec![AnchorCrib::new("A", 0, "ABC"), AnchorCrib::new("B", 2, "CD")];
        let merged = merge_cribs(&cribs, 10).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[&2].origin, "A");
    }

    #[test]
    fn test_merge_rejects_disagreeing_overlap() {
        let cribs = vec![AnchorCrib::new("A", 0, "ABC"), AnchorCrib::new("B", 2, "XD")];
        assert_eq!(
            merge_cribs(&cribs, 10),
            Err(Error::CribConflict {
                position: 2,
                first: "A".into(),
                second: "B".into()
            })
        );
    }

    #[test]
    fn test_shifted_before_zero() {
        assert!(AnchorCrib::new("A", 0, "AB").shifted(-1).is_none());
        let moved = AnchorCrib::new("A", 4, "AB").shifted(1).unwrap();
        assert_eq!((moved.start, moved.end), (5, 6));
    }

    #[test]
    fn test_derived_plaintext_display_and_span() {
        let pt = DerivedPlaintext::parse("AB?D").unwrap();
        assert_eq!(pt.to_string(), "AB?D");
        assert_eq!(pt.span(0, 1).as_deref(), Some("AB"));
        assert_eq!(pt.span(1, 3), None);
        assert_eq!(pt.undetermined_positions(), vec![2]);
        assert!(!pt.is_fully_resolved());
        assert!(pt.digest().is_none());
    }

    #[test]
    fn test_digest_hex_round_trip() {
        let d = Digest::of_text("BERLINCLOCK");
        assert_eq!(Digest::from_hex(&d.to_hex()).unwrap(), d);
        assert!(Digest::from_hex("abcd").is_err());
    }

    #[test]
    fn test_digest_known_value() {
        // sha256("abc")
        let d = Digest::of_text("abc");
        assert_eq!(
            d.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
