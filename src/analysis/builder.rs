//! Wheel Builder: per-class family, period and phase search.
//!
//! For each class, in order:
//! 1. Compute the residue every anchor letter of the class demands under the
//!    trial family.
//! 2. Reject an additive family outright if any demanded residue is zero.
//! 3. Search periods ascending and phases `0..L`, accepting the first pair that
//!    places every anchor letter according to the slot policy.
//! 4. Move to the next family on rejection; with none left the class is
//!    infeasible.
//!
//! Classes are independent, so they are built in parallel when the `parallel`
//! feature is enabled.

use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::family::Family;
use crate::result::{ClassOutcome, FamilyRejection, RejectionReason, SolveOutcome};
use crate::types::{merge_cribs, AnchorCrib, CipherText};
use crate::wheel::{ForceResult, SlotPolicy, Wheel};

/// One anchor letter as seen by its class.
#[derive(Debug, Clone)]
struct AnchorPoint {
    position: usize,
    cipher: u8,
    plain: u8,
    origin: String,
}

/// Run the Wheel Builder over every class.
///
/// Returns `Err` only for inputs the caller must fix (invalid configuration,
/// malformed or conflicting cribs, a classifier producing out-of-range
/// classes). Infeasibility is reported inside the [`SolveOutcome`].
pub fn build_wheels(
    ciphertext: &CipherText,
    cribs: &[AnchorCrib],
    classifier: &dyn Classifier,
    config: &Config,
) -> Result<SolveOutcome> {
    config
        .validate()
        .map_err(|message| Error::InvalidConfig { message })?;
    let requirements = merge_cribs(cribs, ciphertext.len())?;

    let num_classes = classifier.num_classes();
    let mut points: Vec<Vec<AnchorPoint>> = vec![Vec::new(); num_classes];
    for (&position, requirement) in &requirements {
        let class = classifier.classify(position);
        let bucket = points.get_mut(class).ok_or(Error::ClassOutOfRange {
            position,
            class,
            classes: num_classes,
        })?;
        bucket.push(AnchorPoint {
            position,
            cipher: ciphertext.letter(position),
            plain: requirement.letter,
            origin: requirement.origin.clone(),
        });
    }

    #[cfg(feature = "parallel")]
    let classes: Vec<ClassOutcome> = points
        .par_iter()
        .enumerate()
        .map(|(class, anchors)| build_class(class, anchors, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let classes: Vec<ClassOutcome> = points
        .iter()
        .enumerate()
        .map(|(class, anchors)| build_class(class, anchors, config))
        .collect();

    let outcome = SolveOutcome {
        classifier: classifier.name(),
        len: ciphertext.len(),
        classes,
    };
    info!(
        classifier = %outcome.classifier,
        feasible = outcome.is_feasible(),
        infeasible = ?outcome.infeasible_classes(),
        option_a_rejections = outcome.option_a_rejections(),
        "wheel build finished"
    );
    Ok(outcome)
}

fn build_class(class: usize, anchors: &[AnchorPoint], config: &Config) -> ClassOutcome {
    let mut rejected = Vec::new();
    for &family in config.families_for(class) {
        match try_family(class, family, anchors, config) {
            Ok(wheel) => {
                debug!(
                    class,
                    family = %family,
                    period = wheel.period,
                    phase = wheel.phase,
                    anchors = anchors.len(),
                    "class solved"
                );
                return ClassOutcome::Solved { wheel, rejected };
            }
            Err(reason) => {
                debug!(class, family = %family, ?reason, "family rejected");
                rejected.push(FamilyRejection { family, reason });
            }
        }
    }
    debug!(class, tried = rejected.len(), "class infeasible");
    ClassOutcome::Infeasible { class, rejected }
}

fn try_family(
    class: usize,
    family: Family,
    anchors: &[AnchorPoint],
    config: &Config,
) -> std::result::Result<Wheel, RejectionReason> {
    let residues: Vec<u8> = anchors
        .iter()
        .map(|a| family.residue_for(a.cipher, a.plain))
        .collect();

    if family.is_additive() {
        if let Some(i) = residues.iter().position(|&r| r == 0) {
            return Err(RejectionReason::OptionAViolation {
                position: anchors[i].position,
            });
        }
    }

    let mut last = RejectionReason::EmptySearch;
    for period in config.period_min..=config.period_max {
        for phase in 0..period {
            match place(class, family, period, phase, anchors, &residues, config.slot_policy) {
                Ok(wheel) => return Ok(wheel),
                Err(reason) => last = reason,
            }
        }
    }
    Err(last)
}

fn place(
    class: usize,
    family: Family,
    period: usize,
    phase: usize,
    anchors: &[AnchorPoint],
    residues: &[u8],
    policy: SlotPolicy,
) -> std::result::Result<Wheel, RejectionReason> {
    let mut wheel = Wheel::new(class, family, period, phase);
    for (anchor, &residue) in anchors.iter().zip(residues) {
        match wheel.force(anchor.position, residue, &anchor.origin, policy) {
            ForceResult::Forced(_) => {}
            ForceResult::Collision {
                existing,
                requested,
            } => {
                return Err(RejectionReason::SlotCollision {
                    period,
                    phase,
                    slot: wheel.slot_of(anchor.position),
                    position: anchor.position,
                    existing,
                    requested,
                });
            }
            ForceResult::OptionAViolation => {
                return Err(RejectionReason::OptionAViolation {
                    position: anchor.position,
                });
            }
        }
    }
    Ok(wheel)
}
