//! # anchor-wheel
//!
//! Anchor-constrained periodic-substitution solving with proof-grade checks.
//!
//! Given a ciphertext, a set of plaintext anchors at fixed positions and a
//! position classifier, this crate:
//! - Builds one periodic key wheel per class (Vigenère, Variant-Beaufort or
//!   Beaufort) that honours every anchor letter
//! - Propagates the wheels to a derived plaintext, leaving unforced slots as
//!   `?` instead of guessing
//! - Re-encrypts the derivation and checks a pinned SHA-256 digest
//! - Re-runs the pipeline under one-axis perturbations (falsification)
//! - Scores the candidate against skeleton-mirrored null samples and gates it
//!   on Holm-adjusted p-values
//!
//! ## Quick Start
//!
//! ```
//! use anchor_wheel::{AnchorCrib, CipherText, Solver};
//!
//! let ct = CipherText::reference();
//! let cribs = AnchorCrib::reference_set();
//! let solver = Solver::new();
//!
//! let outcome = solver.solve(&ct, &cribs).unwrap();
//! let wheels = outcome.wheel_set().expect("reference anchors are feasible");
//! let plaintext = solver.derive(&ct, &wheels).unwrap();
//! let report = solver.verify(&ct, &wheels, &plaintext).unwrap();
//!
//! assert!(report.round_trip_ok);
//! assert_eq!(plaintext.span(63, 73).as_deref(), Some("BERLINCLOCK"));
//! ```
//!
//! ## Null validation
//!
//! ```
//! use anchor_wheel::{AnchorCrib, CipherText, FunctionWordCount, Solver, WordCoverage};
//! use anchor_wheel::scoring::Metric;
//!
//! let ct = CipherText::reference();
//! let solver = Solver::new().null_samples(200).seed(7);
//! let wheels = solver
//!     .solve(&ct, &AnchorCrib::reference_set())
//!     .unwrap()
//!     .wheel_set()
//!     .unwrap();
//! let plaintext = solver.derive(&ct, &wheels).unwrap();
//!
//! let coverage = WordCoverage::common_english();
//! let function_words = FunctionWordCount::english();
//! let metrics: [&dyn Metric; 2] = [&coverage, &function_words];
//! let decision = solver.validate(&ct, &wheels, &plaintext, &metrics).unwrap();
//! assert_eq!(decision.metrics.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod error;
mod solver;
mod types;

// Functional modules
pub mod analysis;
pub mod classifier;
pub mod family;
pub mod output;
pub mod preflight;
pub mod result;
pub mod scoring;
pub mod statistics;
pub mod wheel;

// Re-exports for public API
pub use analysis::{
    FalsificationHarness, FalsificationReport, GateDecision, NullDistribution, Variant,
    VariantAxis, VerificationReport,
};
pub use classifier::{Classifier, ClassifierFormula};
pub use config::Config;
pub use constants::{
    ALPHABET_LEN, DEFAULT_GATE_ALPHA, DEFAULT_MASTER_SEED, DEFAULT_NULL_SAMPLES,
    DEFAULT_PERIOD_MAX, DEFAULT_PERIOD_MIN, REFERENCE_CIPHERTEXT, REFERENCE_CLASSES,
    REFERENCE_LEN,
};
pub use error::{Error, Result};
pub use family::Family;
pub use result::{ClassOutcome, FamilyRejection, RejectionReason, SolveOutcome};
pub use scoring::{FunctionWordCount, Metric, WordCoverage};
pub use solver::{Solver, SolverReport};
pub use types::{
    letter_char, letter_value, parse_letters, AnchorCrib, Cell, CipherText, DerivedPlaintext,
    Digest,
};
pub use wheel::{CribForcing, Skeleton, SlotPolicy, Wheel, WheelSet};
