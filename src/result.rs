//! Solve outcomes.
//!
//! Collisions, Option-A rejections and infeasible classes are ordinary values:
//! the falsification harness counts them, so they never travel as `Err`.

use serde::{Deserialize, Serialize};

use crate::family::Family;
use crate::wheel::{Wheel, WheelSet};

/// Why one family was rejected for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    /// An anchor demanded a zero residue under an additive family.
    OptionAViolation {
        /// Anchor position demanding the zero residue.
        position: usize,
    },
    /// Every `(L, φ)` in range put two anchors into one slot.
    ///
    /// The fields describe the collision at the last pair searched.
    SlotCollision {
        /// Period of the last attempt.
        period: usize,
        /// Phase of the last attempt.
        phase: usize,
        /// Shared slot.
        slot: usize,
        /// Position whose residue was rejected.
        position: usize,
        /// Residue already in the slot.
        existing: u8,
        /// Residue demanded at `position`.
        requested: u8,
    },
    /// The period range held no candidates.
    EmptySearch,
}

/// A rejected family and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRejection {
    /// Family tried.
    pub family: Family,
    /// Reason for rejection.
    pub reason: RejectionReason,
}

/// Result of building one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassOutcome {
    /// A family, period and phase were found.
    Solved {
        /// The accepted wheel with its forced residues.
        wheel: Wheel,
        /// Families rejected before the accepted one.
        rejected: Vec<FamilyRejection>,
    },
    /// Every family was rejected.
    Infeasible {
        /// Class index.
        class: usize,
        /// One rejection per family tried.
        rejected: Vec<FamilyRejection>,
    },
}

impl ClassOutcome {
    /// Class index.
    pub fn class(&self) -> usize {
        match self {
            ClassOutcome::Solved { wheel, .. } => wheel.class,
            ClassOutcome::Infeasible { class, .. } => *class,
        }
    }

    /// Accepted wheel, if any.
    pub fn wheel(&self) -> Option<&Wheel> {
        match self {
            ClassOutcome::Solved { wheel, .. } => Some(wheel),
            ClassOutcome::Infeasible { .. } => None,
        }
    }

    /// Families rejected on the way.
    pub fn rejected(&self) -> &[FamilyRejection] {
        match self {
            ClassOutcome::Solved { rejected, .. } | ClassOutcome::Infeasible { rejected, .. } => {
                rejected
            }
        }
    }

    /// True for [`ClassOutcome::Solved`].
    pub fn is_solved(&self) -> bool {
        matches!(self, ClassOutcome::Solved { .. })
    }
}

/// Outcome of a full solve: one entry per class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Classifier name.
    pub classifier: String,
    /// Ciphertext length.
    pub len: usize,
    /// Per-class outcomes, in class order.
    pub classes: Vec<ClassOutcome>,
}

impl SolveOutcome {
    /// True when every class was solved.
    pub fn is_feasible(&self) -> bool {
        self.classes.iter().all(ClassOutcome::is_solved)
    }

    /// Indices of infeasible classes.
    pub fn infeasible_classes(&self) -> Vec<usize> {
        self.classes
            .iter()
            .filter(|c| !c.is_solved())
            .map(ClassOutcome::class)
            .collect()
    }

    /// Total number of Option-A rejections across classes.
    pub fn option_a_rejections(&self) -> usize {
        self.classes
            .iter()
            .flat_map(ClassOutcome::rejected)
            .filter(|r| matches!(r.reason, RejectionReason::OptionAViolation { .. }))
            .count()
    }

    /// The wheel set, when every class was solved.
    pub fn wheel_set(&self) -> Option<WheelSet> {
        let wheels = self
            .classes
            .iter()
            .map(|c| c.wheel().cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(WheelSet::new(self.classifier.clone(), self.len, wheels))
    }
}
