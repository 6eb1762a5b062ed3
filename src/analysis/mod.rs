//! The solve, verify and validate pipeline.
//!
//! 1. **Wheel Builder** ([`builder`]): per-class family, period and phase from anchors
//! 2. **Propagation** ([`propagate`]): wheels to derived plaintext
//! 3. **Verification** ([`verify`]): round trip plus digest
//! 4. **Falsification** ([`falsify`]): the pipeline under one-axis perturbations
//! 5. **Null model** ([`null_model`]) and **gate** ([`gate`]): Holm-corrected
//!    significance against mirrored nulls

pub mod builder;
pub mod falsify;
pub mod gate;
pub mod null_model;
pub mod propagate;
pub mod verify;

pub use builder::build_wheels;
pub use falsify::{
    AxisTally, FalsificationHarness, FalsificationRecord, FalsificationReport, Variant,
    VariantAxis,
};
pub use gate::{evaluate_gate, run_gate, GateDecision, MetricDecision};
pub use null_model::{
    null_distributions, score_null_samples, NullDistribution, NullSample, NullSummary,
};
pub use propagate::{derive, derive_complete, encrypt};
pub use verify::{verify, PositionMismatch, VerificationReport};
