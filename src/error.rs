//! Error types for caller-side failures.
//!
//! Solver outcomes such as slot collisions, Option-A rejections and infeasible
//! classes are reported as data (see [`crate::result`]); this enum covers the
//! inputs a caller has to fix and the refusal to publish a derivation.

use thiserror::Error;

/// Errors returned by the solver, verifier and null validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Configuration rejected by [`crate::Config::validate`].
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Reason reported by validation.
        message: String,
    },

    /// A character outside `A..=Z`.
    #[error("invalid letter {found:?} at position {position}")]
    InvalidLetter {
        /// Offending index.
        position: usize,
        /// Offending character.
        found: char,
    },

    /// A crib span falls outside the ciphertext.
    #[error("crib {label} spans {start}..={end}, outside a ciphertext of length {len}")]
    CribOutOfRange {
        /// Crib label.
        label: String,
        /// Inclusive start.
        start: usize,
        /// Inclusive end.
        end: usize,
        /// Ciphertext length.
        len: usize,
    },

    /// A crib's plaintext does not fill its span.
    #[error("crib {label} spans {span} positions but carries {letters} letters")]
    CribLengthMismatch {
        /// Crib label.
        label: String,
        /// Span width.
        span: usize,
        /// Plaintext length.
        letters: usize,
    },

    /// Two cribs demand different letters at the same position.
    #[error("cribs {first} and {second} disagree at position {position}")]
    CribConflict {
        /// Position both cribs cover.
        position: usize,
        /// Label of the crib seen first.
        first: String,
        /// Label of the conflicting crib.
        second: String,
    },

    /// Two sequences that must align have different lengths.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A wheel set was used with a classifier other than the one that built it.
    #[error("wheel set was built with classifier {expected}, not {found}")]
    ClassifierMismatch {
        /// Classifier recorded in the wheel set.
        expected: String,
        /// Classifier supplied by the caller.
        found: String,
    },

    /// A classifier produced a class the wheel set has no wheel for.
    #[error("position {position} classified as {class}, but only {classes} wheels exist")]
    ClassOutOfRange {
        /// Position being classified.
        position: usize,
        /// Class returned.
        class: usize,
        /// Number of wheels.
        classes: usize,
    },

    /// A fully resolved plaintext was demanded but some cells are undetermined.
    #[error("derivation left {} positions undetermined", undetermined.len())]
    IncompleteDerivation {
        /// Undetermined positions, ascending.
        undetermined: Vec<usize>,
    },

    /// Re-encryption did not reproduce the ciphertext.
    #[error("round trip failed at {} positions", positions.len())]
    RoundTripMismatch {
        /// Mismatching positions, ascending.
        positions: Vec<usize>,
    },

    /// Plaintext digest differs from the pinned value.
    #[error("digest mismatch: expected {expected}, computed {actual}")]
    DigestMismatch {
        /// Pinned digest (hex), empty if none was pinned.
        expected: String,
        /// Computed digest (hex), empty if the plaintext is incomplete.
        actual: String,
    },

    /// A null sample's skeleton differs from the candidate's.
    #[error(
        "null sample {sample} diverges from the candidate skeleton in class {class}: \
         expected {expected}, found {found}"
    )]
    NullSkeletonMismatch {
        /// Sample index.
        sample: usize,
        /// First diverging class.
        class: usize,
        /// Candidate's `family/period/phase`.
        expected: String,
        /// Sample's `family/period/phase`.
        found: String,
    },

    /// A wheel read back from an archive is malformed.
    #[error("invalid wheel for class {class}: {reason}")]
    InvalidWheel {
        /// Class the wheel claims.
        class: usize,
        /// Why it was rejected.
        reason: String,
    },

    /// A digest string that is not 32 bytes of hex.
    #[error("invalid digest {value:?}: {reason}")]
    InvalidDigest {
        /// The string supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A metric scored NaN or infinity, on the candidate (`sample: None`) or
    /// on a null sample.
    #[error("metric {metric} returned a non-finite score{}", sample.map(|i| format!(" on null sample {i}")).unwrap_or_default())]
    NonFiniteMetric {
        /// Metric name.
        metric: String,
        /// Null sample index, if the value came from the null batch.
        sample: Option<usize>,
    },

    /// The null validator was asked to test zero metrics.
    #[error("null validation requires at least one metric")]
    EmptyMetricSet,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
