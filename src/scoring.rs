//! Scoring functions over derived plaintext.
//!
//! The null validator treats metrics as opaque: anything implementing
//! [`Metric`] can be tested. Higher scores mean "more English-like"; the
//! p-value is one-sided in that direction.

use crate::constants::{COMMON_WORDS, FUNCTION_WORDS};
use crate::types::{parse_letters, Cell, DerivedPlaintext};

/// A scalar score of a derived plaintext.
pub trait Metric: Send + Sync {
    /// Stable name used as the key in gate decisions.
    fn name(&self) -> &str;

    /// Score the plaintext. Undetermined cells never match anything.
    fn score(&self, plaintext: &DerivedPlaintext) -> f64;
}

fn word_list<I, S>(words: I, min_len: usize) -> Vec<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut list: Vec<Vec<u8>> = words
        .into_iter()
        .filter_map(|w| parse_letters(&w.as_ref().to_ascii_uppercase()).ok())
        .filter(|w| !w.is_empty() && w.len() >= min_len)
        .collect();
    list.sort();
    list.dedup();
    list
}

fn matches_at(cells: &[Cell], start: usize, word: &[u8]) -> bool {
    cells
        .get(start..start + word.len())
        .is_some_and(|window| {
            window
                .iter()
                .zip(word)
                .all(|(cell, &letter)| *cell == Cell::Resolved(letter))
        })
}

/// Fraction of resolved letters covered by non-overlapping dictionary words.
///
/// Coverage is maximised by dynamic programming over word end positions.
#[derive(Debug, Clone)]
pub struct WordCoverage {
    words: Vec<Vec<u8>>,
    min_len: usize,
}

impl WordCoverage {
    /// Coverage over `words`, ignoring words shorter than `min_len`.
    ///
    /// Words with non-letters are dropped.
    pub fn new<I, S>(words: I, min_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let min_len = min_len.max(1);
        Self {
            words: word_list(words, min_len),
            min_len,
        }
    }

    /// Coverage over the built-in lexicon, words of 3+ letters.
    pub fn common_english() -> Self {
        Self::new(COMMON_WORDS.iter().copied(), 3)
    }

    /// Minimum word length counted.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Largest number of letters coverable by non-overlapping words.
    pub fn covered_letters(&self, plaintext: &DerivedPlaintext) -> usize {
        let cells = plaintext.cells();
        let mut best = vec![0usize; cells.len() + 1];
        for end in 1..=cells.len() {
            best[end] = best[end - 1];
            for word in &self.words {
                if word.len() <= end && matches_at(cells, end - word.len(), word) {
                    best[end] = best[end].max(best[end - word.len()] + word.len());
                }
            }
        }
        best[cells.len()]
    }
}

impl Metric for WordCoverage {
    fn name(&self) -> &str {
        "word_coverage"
    }

    fn score(&self, plaintext: &DerivedPlaintext) -> f64 {
        let resolved = plaintext.resolved_count();
        if resolved == 0 {
            return 0.0;
        }
        self.covered_letters(plaintext) as f64 / resolved as f64
    }
}

/// Number of occurrences of common function words, overlaps included.
#[derive(Debug, Clone)]
pub struct FunctionWordCount {
    words: Vec<Vec<u8>>,
}

impl FunctionWordCount {
    /// Count occurrences of `words`.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: word_list(words, 1),
        }
    }

    /// Count the built-in English function words.
    pub fn english() -> Self {
        Self::new(FUNCTION_WORDS.iter().copied())
    }
}

impl Default for FunctionWordCount {
    fn default() -> Self {
        Self::english()
    }
}

impl Metric for FunctionWordCount {
    fn name(&self) -> &str {
        "function_words"
    }

    fn score(&self, plaintext: &DerivedPlaintext) -> f64 {
        let cells = plaintext.cells();
        let hits: usize = (0..cells.len())
            .map(|start| {
                self.words
                    .iter()
                    .filter(|w| matches_at(cells, start, w))
                    .count()
            })
            .sum();
        hits as f64
    }
}

/// Score `plaintext` with every metric, in order.
pub fn score_all(metrics: &[&dyn Metric], plaintext: &DerivedPlaintext) -> Vec<f64> {
    metrics.iter().map(|m| m.score(plaintext)).collect()
}
