//! Wheels: per-class key-residue tables.
//!
//! A wheel holds a family, a period `L`, a phase `φ` and one residue per slot,
//! where the slot of a position is `(position - φ) mod L`. Positions of the
//! same class that land in the same slot share one residue.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::constants::ALPHABET_LEN;
use crate::error::{Error, Result};
use crate::family::Family;
use crate::types::{AnchorCrib, CipherText};

/// How anchors may share a slot during the period search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotPolicy {
    /// Every anchor-covered position of a class needs a slot of its own.
    #[default]
    Distinct,
    /// Anchors may share a slot when they demand the same residue.
    Consistent,
}

/// Residue demanded by one crib letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueConstraint {
    /// Class of the constrained position.
    pub class: usize,
    /// Slot within the class wheel.
    pub slot: usize,
    /// Required residue.
    pub residue: u8,
    /// Position of the crib letter.
    pub position: usize,
    /// Label of the crib.
    pub origin: String,
}

/// Outcome of forcing one residue into a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceResult {
    /// The slot now holds this residue.
    Forced(u8),
    /// The slot already holds a residue the policy does not allow to be shared.
    Collision {
        /// Residue already in the slot.
        existing: u8,
        /// Residue that was demanded.
        requested: u8,
    },
    /// A zero residue under an additive family.
    OptionAViolation,
}

impl ForceResult {
    /// True for [`ForceResult::Forced`].
    pub fn is_forced(self) -> bool {
        matches!(self, ForceResult::Forced(_))
    }
}

/// Family, period and phase of one class: everything but the residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassSkeleton {
    /// Class index.
    pub class: usize,
    /// Cipher family.
    pub family: Family,
    /// Period.
    pub period: usize,
    /// Phase.
    pub phase: usize,
}

impl fmt::Display for ClassSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/L={}/φ={}", self.family, self.period, self.phase)
    }
}

/// Structural skeleton of a wheel set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skeleton {
    /// Classifier name.
    pub classifier: String,
    /// One entry per class, in class order.
    pub classes: Vec<ClassSkeleton>,
}

impl Skeleton {
    /// First class where `other` differs from `self`, as `(class, ours, theirs)`.
    ///
    /// A classifier or class-count difference is reported against class 0
    /// (or the first missing class).
    pub fn first_divergence(&self, other: &Skeleton) -> Option<(usize, String, String)> {
        if self.classifier != other.classifier {
            return Some((0, self.classifier.clone(), other.classifier.clone()));
        }
        let n = self.classes.len().max(other.classes.len());
        (0..n).find_map(|i| match (self.classes.get(i), other.classes.get(i)) {
            (Some(a), Some(b)) if a == b => None,
            (a, b) => Some((
                i,
                a.map_or_else(|| "<missing>".to_string(), ToString::to_string),
                b.map_or_else(|| "<missing>".to_string(), ToString::to_string),
            )),
        })
    }
}

/// Key-residue table for one class.
///
/// Deserialization applies the same shape checks as [`Wheel::new`] and also
/// requires every residue and crib constraint to fit the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWheel")]
pub struct Wheel {
    /// Class index.
    pub class: usize,
    /// Cipher family.
    pub family: Family,
    /// Period `L`.
    pub period: usize,
    /// Phase `φ`, `< period`.
    pub phase: usize,
    residues: Vec<Option<u8>>,
    constraints: Vec<ResidueConstraint>,
}

#[derive(Deserialize)]
struct RawWheel {
    class: usize,
    family: Family,
    period: usize,
    phase: usize,
    residues: Vec<Option<u8>>,
    constraints: Vec<ResidueConstraint>,
}

impl TryFrom<RawWheel> for Wheel {
    type Error = Error;

    fn try_from(raw: RawWheel) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidWheel {
            class: raw.class,
            reason,
        };
        if raw.period == 0 {
            return Err(invalid("period must be positive".to_string()));
        }
        if raw.phase >= raw.period {
            return Err(invalid(format!(
                "phase {} not below period {}",
                raw.phase, raw.period
            )));
        }
        if raw.residues.len() != raw.period {
            return Err(invalid(format!(
                "{} residues for period {}",
                raw.residues.len(),
                raw.period
            )));
        }
        if let Some(slot) = raw
            .residues
            .iter()
            .position(|r| r.is_some_and(|v| v >= ALPHABET_LEN))
        {
            return Err(invalid(format!("residue in slot {slot} out of range")));
        }
        for c in &raw.constraints {
            let held = raw.residues.get(c.slot).copied().flatten();
            if c.class != raw.class || held != Some(c.residue) {
                return Err(invalid(format!(
                    "constraint from {} at position {} does not match slot {}",
                    c.origin, c.position, c.slot
                )));
            }
        }
        Ok(Self {
            class: raw.class,
            family: raw.family,
            period: raw.period,
            phase: raw.phase,
            residues: raw.residues,
            constraints: raw.constraints,
        })
    }
}

impl Wheel {
    /// A wheel with every slot unforced.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or `phase >= period`.
    pub fn new(class: usize, family: Family, period: usize, phase: usize) -> Self {
        assert!(period > 0, "period must be positive");
        assert!(phase < period, "phase must be < period");
        Self {
            class,
            family,
            period,
            phase,
            residues: vec![None; period],
            constraints: Vec::new(),
        }
    }

    /// Slot of `position`: `(position - phase) mod period`.
    pub fn slot_of(&self, position: usize) -> usize {
        (position % self.period + self.period - self.phase) % self.period
    }

    /// Residue at `slot`, if forced. `None` for a slot outside the period.
    pub fn residue(&self, slot: usize) -> Option<u8> {
        self.residues.get(slot).copied().flatten()
    }

    /// Residue governing `position`, if forced.
    pub fn residue_at(&self, position: usize) -> Option<u8> {
        self.residues[self.slot_of(position)]
    }

    /// All slot residues.
    pub fn residues(&self) -> &[Option<u8>] {
        &self.residues
    }

    /// Crib evidence behind the forced slots, in forcing order.
    pub fn constraints(&self) -> &[ResidueConstraint] {
        &self.constraints
    }

    /// Number of forced slots.
    pub fn forced_count(&self) -> usize {
        self.residues.iter().filter(|r| r.is_some()).count()
    }

    /// True if `slot` was forced by a crib.
    pub fn is_crib_forced(&self, slot: usize) -> bool {
        self.constraints.iter().any(|c| c.slot == slot)
    }

    /// Family, period and phase of this wheel.
    pub fn skeleton(&self) -> ClassSkeleton {
        ClassSkeleton {
            class: self.class,
            family: self.family,
            period: self.period,
            phase: self.phase,
        }
    }

    /// Force the residue demanded at `position`.
    ///
    /// Option-A is checked before the slot is looked at, so a zero residue
    /// under an additive family is reported even for an empty slot.
    pub fn force(
        &mut self,
        position: usize,
        residue: u8,
        origin: &str,
        policy: SlotPolicy,
    ) -> ForceResult {
        let residue = residue % ALPHABET_LEN;
        if self.family.is_additive() && residue == 0 {
            return ForceResult::OptionAViolation;
        }
        let slot = self.slot_of(position);
        let result = match (self.residues[slot], policy) {
            (None, _) => ForceResult::Forced(residue),
            (Some(existing), SlotPolicy::Consistent) if existing == residue => {
                ForceResult::Forced(residue)
            }
            (Some(existing), _) => ForceResult::Collision {
                existing,
                requested: residue,
            },
        };
        if result.is_forced() {
            self.residues[slot] = Some(residue);
            self.constraints.push(ResidueConstraint {
                class: self.class,
                slot,
                residue,
                position,
                origin: origin.to_string(),
            });
        }
        result
    }

    /// Overwrite a slot residue without recording crib evidence.
    ///
    /// Used to fill unforced slots for null samples, and to perturb a wheel
    /// when checking that the verifier notices. Slots outside the period are
    /// ignored.
    pub fn set_residue(&mut self, slot: usize, residue: u8) {
        if let Some(r) = self.residues.get_mut(slot) {
            *r = Some(residue % ALPHABET_LEN);
        }
    }
}

/// Per-position record of forcing a crib into a wheel set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionForce {
    /// Crib position.
    pub position: usize,
    /// Class of the position.
    pub class: usize,
    /// Slot within the class wheel.
    pub slot: usize,
    /// Tagged outcome.
    pub result: ForceResult,
}

/// Result of [`WheelSet::force_crib`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CribForcing {
    /// Crib label.
    pub crib: String,
    /// One entry per crib letter.
    pub positions: Vec<PositionForce>,
}

impl CribForcing {
    /// True when every letter was forced.
    pub fn accepted(&self) -> bool {
        self.positions.iter().all(|p| p.result.is_forced())
    }

    /// First rejected letter, if any.
    pub fn first_rejection(&self) -> Option<&PositionForce> {
        self.positions.iter().find(|p| !p.result.is_forced())
    }
}

/// One wheel per class plus the classifier that routes positions to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWheelSet")]
pub struct WheelSet {
    classifier: String,
    len: usize,
    wheels: Vec<Wheel>,
}

#[derive(Deserialize)]
struct RawWheelSet {
    classifier: String,
    len: usize,
    wheels: Vec<Wheel>,
}

impl TryFrom<RawWheelSet> for WheelSet {
    type Error = Error;

    fn try_from(raw: RawWheelSet) -> Result<Self> {
        if let Some((i, w)) = raw.wheels.iter().enumerate().find(|(i, w)| w.class != *i) {
            return Err(Error::InvalidWheel {
                class: w.class,
                reason: format!("stored at index {i}"),
            });
        }
        Ok(Self {
            classifier: raw.classifier,
            len: raw.len,
            wheels: raw.wheels,
        })
    }
}

impl WheelSet {
    /// Assemble a wheel set. `wheels[i].class` must equal `i`.
    pub fn new(classifier: impl Into<String>, len: usize, wheels: Vec<Wheel>) -> Self {
        debug_assert!(wheels.iter().enumerate().all(|(i, w)| w.class == i));
        Self {
            classifier: classifier.into(),
            len,
            wheels,
        }
    }

    /// Name of the classifier the set was built with.
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Ciphertext length the set covers.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the set covers no positions.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All wheels in class order.
    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    /// Wheel for `class`.
    pub fn wheel(&self, class: usize) -> Option<&Wheel> {
        self.wheels.get(class)
    }

    /// Mutable wheel for `class`.
    pub fn wheel_mut(&mut self, class: usize) -> Option<&mut Wheel> {
        self.wheels.get_mut(class)
    }

    /// Structural skeleton.
    pub fn skeleton(&self) -> Skeleton {
        Skeleton {
            classifier: self.classifier.clone(),
            classes: self.wheels.iter().map(Wheel::skeleton).collect(),
        }
    }

    /// All crib constraints across wheels.
    pub fn constraints(&self) -> impl Iterator<Item = &ResidueConstraint> {
        self.wheels.iter().flat_map(|w| w.constraints().iter())
    }

    /// Fail unless `classifier` is the one this set was built with.
    pub fn check_classifier(&self, classifier: &dyn Classifier) -> Result<()> {
        let name = classifier.name();
        if name != self.classifier {
            return Err(Error::ClassifierMismatch {
                expected: self.classifier.clone(),
                found: name,
            });
        }
        Ok(())
    }

    /// Class and wheel for `position`.
    pub(crate) fn route(
        &self,
        classifier: &dyn Classifier,
        position: usize,
    ) -> Result<(usize, &Wheel)> {
        let class = classifier.classify(position);
        self.wheels
            .get(class)
            .map(|w| (class, w))
            .ok_or(Error::ClassOutOfRange {
                position,
                class,
                classes: self.wheels.len(),
            })
    }

    /// Force an extra crib into the existing wheels without re-searching
    /// family, period or phase.
    ///
    /// Shared slots are accepted when they agree. The set is only modified
    /// when every letter is forced; otherwise it is left untouched and the
    /// returned record shows which letters were rejected.
    pub fn force_crib(
        &mut self,
        ciphertext: &CipherText,
        crib: &AnchorCrib,
        classifier: &dyn Classifier,
    ) -> Result<CribForcing> {
        self.check_classifier(classifier)?;
        if ciphertext.len() != self.len {
            return Err(Error::LengthMismatch {
                expected: self.len,
                found: ciphertext.len(),
            });
        }
        crib.validate(self.len)?;

        let mut trial = self.wheels.clone();
        let mut positions = Vec::with_capacity(crib.width());
        for (position, letter) in crib.points() {
            let class = classifier.classify(position);
            let wheel = trial.get_mut(class).ok_or(Error::ClassOutOfRange {
                position,
                class,
                classes: self.wheels.len(),
            })?;
            let residue = wheel.family.residue_for(ciphertext.letter(position), letter);
            let slot = wheel.slot_of(position);
            let result = wheel.force(position, residue, &crib.label, SlotPolicy::Consistent);
            positions.push(PositionForce {
                position,
                class,
                slot,
                result,
            });
        }

        let forcing = CribForcing {
            crib: crib.label.clone(),
            positions,
        };
        if forcing.accepted() {
            self.wheels = trial;
        }
        Ok(forcing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_of_wraps_phase() {
        let wheel = Wheel::new(0, Family::Vigenere, 10, 3);
        assert_eq!(wheel.slot_of(3), 0);
        assert_eq!(wheel.slot_of(0), 7);
        assert_eq!(wheel.slot_of(25), 2);
    }

    #[test]
    fn test_force_option_a() {
        let mut wheel = Wheel::new(0, Family::VariantBeaufort, 10, 0);
        assert_eq!(
            wheel.force(4, 0, "X", SlotPolicy::Distinct),
            ForceResult::OptionAViolation
        );
        assert_eq!(wheel.forced_count(), 0);

        let mut beaufort = Wheel::new(0, Family::Beaufort, 10, 0);
        assert_eq!(
            beaufort.force(4, 0, "X", SlotPolicy::Distinct),
            ForceResult::Forced(0)
        );
    }

    #[test]
    fn test_force_distinct_rejects_shared_slot() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 10, 0);
        assert_eq!(wheel.force(2, 5, "A", SlotPolicy::Distinct), ForceResult::Forced(5));
        assert_eq!(
            wheel.force(12, 5, "B", SlotPolicy::Distinct),
            ForceResult::Collision {
                existing: 5,
                requested: 5
            }
        );
    }

    #[test]
    fn test_force_consistent_accepts_agreement_only() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 10, 0);
        assert!(wheel.force(2, 5, "A", SlotPolicy::Consistent).is_forced());
        assert!(wheel.force(12, 5, "B", SlotPolicy::Consistent).is_forced());
        assert_eq!(
            wheel.force(22, 6, "C", SlotPolicy::Consistent),
            ForceResult::Collision {
                existing: 5,
                requested: 6
            }
        );
        assert_eq!(wheel.constraints().len(), 2);
        assert_eq!(wheel.forced_count(), 1);
    }

    fn archived(period: usize, phase: usize, residues: &str) -> String {
        format!(
            r#"{{"class":0,"family":"Vigenere","period":{period},"phase":{phase},"residues":{residues},"constraints":[]}}"#
        )
    }

    #[test]
    fn test_deserialize_accepts_valid_wheel() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 3, 1);
        wheel.force(1, 7, "A", SlotPolicy::Distinct);
        let json = serde_json::to_string(&wheel).unwrap();
        let back: Wheel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wheel);
    }

    #[test]
    fn test_deserialize_rejects_malformed_wheel() {
        for (period, phase, residues) in [
            (10, 0, "[]"),
            (0, 0, "[]"),
            (2, 2, "[null,null]"),
            (2, 0, "[null,26]"),
        ] {
            let json = archived(period, phase, residues);
            assert!(serde_json::from_str::<Wheel>(&json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_deserialize_rejects_dangling_constraint() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 3, 0);
        wheel.force(1, 7, "A", SlotPolicy::Distinct);
        let json = serde_json::to_string(&wheel)
            .unwrap()
            .replace("[null,7,null]", "[null,8,null]");
        let err = serde_json::from_str::<Wheel>(&json).unwrap_err();
        assert!(err.to_string().contains("does not match slot 1"));
    }

    #[test]
    fn test_deserialize_rejects_misordered_wheel_set() {
        let set = WheelSet::new("c", 20, vec![Wheel::new(0, Family::Vigenere, 10, 0)]);
        let json = serde_json::to_string(&set).unwrap().replace(r#""class":0"#, r#""class":1"#);
        assert!(serde_json::from_str::<WheelSet>(&json).is_err());
    }

    #[test]
    fn test_residue_outside_period_is_none() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 4, 0);
        wheel.set_residue(9, 3);
        assert_eq!(wheel.residue(9), None);
        assert_eq!(wheel.forced_count(), 0);
    }

    #[test]
    fn test_skeleton_divergence() {
        let a = WheelSet::new("c", 20, vec![Wheel::new(0, Family::Vigenere, 10, 0)]);
        let b = WheelSet::new("c", 20, vec![Wheel::new(0, Family::Vigenere, 11, 0)]);
        assert_eq!(a.skeleton().first_divergence(&a.skeleton()), None);
        let (class, ours, theirs) = a.skeleton().first_divergence(&b.skeleton()).unwrap();
        assert_eq!(class, 0);
        assert_eq!(ours, "vigenere/L=10/φ=0");
        assert_eq!(theirs, "vigenere/L=11/φ=0");
    }
}
