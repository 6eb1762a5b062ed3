//! Falsification Harness.
//!
//! Holds the ciphertext, anchors, classifier and configuration fixed and runs
//! the full build, derive and verify pipeline once per [`Variant`], each of
//! which perturbs exactly one axis. The output is a frequency table of
//! feasible and round-tripping runs per axis; no inference happens here.
//!
//! Mutation variants are forced into the accepted wheels with the skeleton
//! pinned, so they test whether the accepted key material tolerates a
//! different letter rather than whether some other key would.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::builder::build_wheels;
use super::propagate::derive;
use super::verify::verify;
use crate::classifier::{Classifier, ClassifierFormula};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{letter_char, merge_cribs, AnchorCrib, CipherText, DerivedPlaintext, Digest};
use crate::wheel::WheelSet;

/// The axis a variant perturbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariantAxis {
    /// Unperturbed run.
    Baseline,
    /// Alternate classifier formula.
    Classifier,
    /// Single-letter mutation of the accepted plaintext.
    Mutation,
    /// Shifted, split or merged anchors.
    AnchorBoundary,
}

impl fmt::Display for VariantAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariantAxis::Baseline => "baseline",
            VariantAxis::Classifier => "classifier",
            VariantAxis::Mutation => "mutation",
            VariantAxis::AnchorBoundary => "anchor boundary",
        })
    }
}

/// One falsification run, described as data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// The unperturbed pipeline.
    Baseline,
    /// Replace the classifier.
    Classifier(ClassifierFormula),
    /// Feed back the accepted span `start..=end` with one letter replaced.
    Mutation {
        /// Span start.
        start: usize,
        /// Span end (inclusive).
        end: usize,
        /// Mutated position, inside the span.
        position: usize,
        /// Replacement letter value.
        letter: u8,
    },
    /// Translate each anchor by its delta.
    Shift {
        /// One delta per anchor, in anchor order.
        deltas: Vec<isize>,
    },
    /// Split one anchor in two and translate the tail.
    Split {
        /// Anchor index.
        anchor: usize,
        /// Offset within the anchor where the tail starts.
        at: usize,
        /// Translation applied to the tail.
        offset: isize,
    },
    /// Merge anchor `first` and its successor into one contiguous crib
    /// starting at the first anchor.
    Merge {
        /// Index of the first anchor.
        first: usize,
    },
}

impl Variant {
    /// Axis perturbed by this variant.
    pub fn axis(&self) -> VariantAxis {
        match self {
            Variant::Baseline => VariantAxis::Baseline,
            Variant::Classifier(_) => VariantAxis::Classifier,
            Variant::Mutation { .. } => VariantAxis::Mutation,
            Variant::Shift { .. } | Variant::Split { .. } | Variant::Merge { .. } => {
                VariantAxis::AnchorBoundary
            }
        }
    }

    /// One variant per formula of [`ClassifierFormula::sweep`].
    pub fn classifier_sweep() -> Vec<Variant> {
        ClassifierFormula::sweep()
            .into_iter()
            .map(Variant::Classifier)
            .collect()
    }

    /// Every single-letter substitution at every resolved position of each
    /// span: 25 variants per resolved position.
    pub fn mutations(plaintext: &DerivedPlaintext, spans: &[(usize, usize)]) -> Vec<Variant> {
        let mut variants = Vec::new();
        for &(start, end) in spans {
            for position in start..=end.min(plaintext.len().saturating_sub(1)) {
                let Some(current) = plaintext.cell(position).letter() else {
                    continue;
                };
                variants.extend((0..26u8).filter(|&l| l != current).map(|letter| {
                    Variant::Mutation {
                        start,
                        end,
                        position,
                        letter,
                    }
                }));
            }
        }
        variants
    }

    /// Every joint translation of `anchors` anchors by `-radius..=radius`,
    /// identity excluded: `(2r + 1)^k - 1` variants.
    pub fn anchor_shift_grid(anchors: usize, radius: usize) -> Vec<Variant> {
        let r = radius as isize;
        let mut grid: Vec<Vec<isize>> = vec![Vec::new()];
        for _ in 0..anchors {
            grid = grid
                .into_iter()
                .flat_map(|prefix| {
                    (-r..=r).map(move |d| {
                        let mut next = prefix.clone();
                        next.push(d);
                        next
                    })
                })
                .collect();
        }
        grid.into_iter()
            .filter(|deltas| deltas.iter().any(|&d| d != 0))
            .map(|deltas| Variant::Shift { deltas })
            .collect()
    }

    /// Each anchor moved alone by every nonzero delta in `-radius..=radius`.
    pub fn single_shifts(anchors: usize, radius: usize) -> Vec<Variant> {
        let r = radius as isize;
        (0..anchors)
            .flat_map(|a| {
                (-r..=r).filter(|&d| d != 0).map(move |d| {
                    let mut deltas = vec![0; anchors];
                    deltas[a] = d;
                    Variant::Shift { deltas }
                })
            })
            .collect()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Baseline => f.write_str("baseline"),
            Variant::Classifier(formula) => write!(f, "classifier {formula}"),
            Variant::Mutation {
                start,
                end,
                position,
                letter,
            } => write!(
                f,
                "mutate {position}->{} in {start}..={end}",
                letter_char(*letter)
            ),
            Variant::Shift { deltas } => {
                let parts: Vec<String> = deltas.iter().map(|d| format!("{d:+}")).collect();
                write!(f, "shift [{}]", parts.join(", "))
            }
            Variant::Split { anchor, at, offset } => {
                write!(f, "split anchor {anchor} at {at}, tail {offset:+}")
            }
            Variant::Merge { first } => match first.checked_add(1) {
                Some(second) => write!(f, "merge anchors {first}+{second}"),
                None => write!(f, "merge anchor {first} with its successor"),
            },
        }
    }
}

/// Outcome of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FalsificationRecord {
    /// The variant run.
    pub variant: Variant,
    /// Wheels were found (or, for mutations, the mutated crib was forced).
    pub feasible: bool,
    /// The resulting plaintext re-encrypted to the ciphertext.
    pub round_trip_ok: bool,
    /// The resulting plaintext had no undetermined cells.
    pub fully_resolved: bool,
    /// The plaintext digest matched the pinned one.
    pub digest_match: bool,
    /// Why the run was infeasible, when it was.
    pub reason: Option<String>,
}

impl FalsificationRecord {
    fn infeasible(variant: &Variant, reason: impl Into<String>) -> Self {
        Self {
            variant: variant.clone(),
            feasible: false,
            round_trip_ok: false,
            fully_resolved: false,
            digest_match: false,
            reason: Some(reason.into()),
        }
    }
}

/// Counts for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTally {
    /// Axis.
    pub axis: VariantAxis,
    /// Variants run.
    pub total: usize,
    /// Feasible runs.
    pub feasible: usize,
    /// Runs that round-tripped.
    pub round_trip_ok: usize,
}

/// All records of a batch, in variant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FalsificationReport {
    /// One record per variant.
    pub records: Vec<FalsificationRecord>,
}

impl FalsificationReport {
    /// Counts for `axis`.
    pub fn tally(&self, axis: VariantAxis) -> AxisTally {
        let on_axis = || self.records.iter().filter(move |r| r.variant.axis() == axis);
        AxisTally {
            axis,
            total: on_axis().count(),
            feasible: on_axis().filter(|r| r.feasible).count(),
            round_trip_ok: on_axis().filter(|r| r.round_trip_ok).count(),
        }
    }

    /// Frequency table over the axes present, in axis order.
    pub fn table(&self) -> Vec<AxisTally> {
        let mut axes: Vec<VariantAxis> = self.records.iter().map(|r| r.variant.axis()).collect();
        axes.sort();
        axes.dedup();
        axes.into_iter().map(|a| self.tally(a)).collect()
    }

    /// Records of feasible runs.
    pub fn feasible(&self) -> impl Iterator<Item = &FalsificationRecord> {
        self.records.iter().filter(|r| r.feasible)
    }
}

#[derive(Debug, Clone)]
struct Accepted {
    wheels: WheelSet,
    plaintext: DerivedPlaintext,
}

/// Batch driver over a fixed ciphertext, anchor set and classifier.
#[derive(Clone)]
pub struct FalsificationHarness {
    ciphertext: CipherText,
    anchors: Vec<AnchorCrib>,
    classifier: Arc<dyn Classifier>,
    config: Config,
    expected_digest: Option<Digest>,
    accepted: Option<Accepted>,
}

impl FalsificationHarness {
    /// Validate the inputs and solve the baseline once.
    ///
    /// An infeasible baseline is not an error; mutation variants then report
    /// themselves infeasible.
    pub fn new(
        ciphertext: CipherText,
        anchors: Vec<AnchorCrib>,
        classifier: Arc<dyn Classifier>,
        config: Config,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|message| Error::InvalidConfig { message })?;
        merge_cribs(&anchors, ciphertext.len())?;

        let outcome = build_wheels(&ciphertext, &anchors, classifier.as_ref(), &config)?;
        let accepted = match outcome.wheel_set() {
            Some(wheels) => {
                let plaintext = derive(&ciphertext, &wheels, classifier.as_ref())?;
                Some(Accepted { wheels, plaintext })
            }
            None => None,
        };
        info!(
            classifier = %classifier.name(),
            anchors = anchors.len(),
            baseline_feasible = accepted.is_some(),
            "falsification harness ready"
        );
        Ok(Self {
            ciphertext,
            anchors,
            classifier,
            config,
            expected_digest: None,
            accepted,
        })
    }

    /// Pin the plaintext digest every run is checked against.
    pub fn with_expected_digest(mut self, digest: Digest) -> Self {
        self.expected_digest = Some(digest);
        self
    }

    /// Baseline wheels, if the baseline was feasible.
    pub fn accepted_wheels(&self) -> Option<&WheelSet> {
        self.accepted.as_ref().map(|a| &a.wheels)
    }

    /// Baseline plaintext, if the baseline was feasible.
    pub fn accepted_plaintext(&self) -> Option<&DerivedPlaintext> {
        self.accepted.as_ref().map(|a| &a.plaintext)
    }

    /// Run every variant. Runs are independent and executed in parallel when
    /// the `parallel` feature is enabled; records keep variant order.
    pub fn run(&self, variants: &[Variant]) -> FalsificationReport {
        #[cfg(feature = "parallel")]
        let records: Vec<FalsificationRecord> =
            variants.par_iter().map(|v| self.run_variant(v)).collect();

        #[cfg(not(feature = "parallel"))]
        let records: Vec<FalsificationRecord> =
            variants.iter().map(|v| self.run_variant(v)).collect();

        let report = FalsificationReport { records };
        for tally in report.table() {
            info!(
                axis = %tally.axis,
                total = tally.total,
                feasible = tally.feasible,
                round_trip_ok = tally.round_trip_ok,
                "falsification tally"
            );
        }
        report
    }

    /// Run a single variant.
    pub fn run_variant(&self, variant: &Variant) -> FalsificationRecord {
        let result = match variant {
            Variant::Baseline => {
                self.run_pipeline(variant, self.classifier.as_ref(), &self.anchors)
            }
            Variant::Classifier(formula) => self.run_pipeline(variant, formula, &self.anchors),
            Variant::Mutation {
                start,
                end,
                position,
                letter,
            } => self.run_mutation(variant, *start, *end, *position, *letter),
            Variant::Shift { .. } | Variant::Split { .. } | Variant::Merge { .. } => {
                match self.perturb(variant) {
                    Ok(anchors) => self.run_pipeline(variant, self.classifier.as_ref(), &anchors),
                    Err(reason) => Ok(FalsificationRecord::infeasible(variant, reason)),
                }
            }
        };
        result.unwrap_or_else(|e| FalsificationRecord::infeasible(variant, e.to_string()))
    }

    fn run_pipeline(
        &self,
        variant: &Variant,
        classifier: &dyn Classifier,
        anchors: &[AnchorCrib],
    ) -> Result<FalsificationRecord> {
        let outcome = build_wheels(&self.ciphertext, anchors, classifier, &self.config)?;
        let Some(wheels) = outcome.wheel_set() else {
            return Ok(FalsificationRecord::infeasible(
                variant,
                format!("infeasible classes {:?}", outcome.infeasible_classes()),
            ));
        };
        let plaintext = derive(&self.ciphertext, &wheels, classifier)?;
        let report = verify(
            &self.ciphertext,
            &wheels,
            classifier,
            &plaintext,
            self.expected_digest.as_ref(),
        )?;
        Ok(FalsificationRecord {
            variant: variant.clone(),
            feasible: true,
            round_trip_ok: report.round_trip_ok,
            fully_resolved: report.fully_resolved,
            digest_match: report.digest_match,
            reason: None,
        })
    }

    fn run_mutation(
        &self,
        variant: &Variant,
        start: usize,
        end: usize,
        position: usize,
        letter: u8,
    ) -> Result<FalsificationRecord> {
        let Some(accepted) = &self.accepted else {
            return Ok(FalsificationRecord::infeasible(variant, "baseline infeasible"));
        };
        if !(start..=end).contains(&position) {
            return Ok(FalsificationRecord::infeasible(
                variant,
                format!("position {position} outside span {start}..={end}"),
            ));
        }
        let Some(span) = accepted.plaintext.span(start, end) else {
            return Ok(FalsificationRecord::infeasible(
                variant,
                format!("span {start}..={end} is not fully resolved"),
            ));
        };

        let mut text: Vec<char> = span.chars().collect();
        text[position - start] = letter_char(letter);
        let crib = AnchorCrib::with_span(
            "mutation",
            start,
            end,
            text.into_iter().collect::<String>(),
        );

        let mut wheels = accepted.wheels.clone();
        let forcing = wheels.force_crib(&self.ciphertext, &crib, self.classifier.as_ref())?;
        let mutated = accepted.plaintext.with_letter(position, letter);
        let report = verify(
            &self.ciphertext,
            &wheels,
            self.classifier.as_ref(),
            &mutated,
            self.expected_digest.as_ref(),
        )?;

        Ok(FalsificationRecord {
            variant: variant.clone(),
            feasible: forcing.accepted(),
            round_trip_ok: report.round_trip_ok,
            fully_resolved: report.fully_resolved,
            digest_match: report.digest_match,
            reason: forcing
                .first_rejection()
                .map(|p| format!("position {} slot {}: {:?}", p.position, p.slot, p.result)),
        })
    }

    fn perturb(&self, variant: &Variant) -> std::result::Result<Vec<AnchorCrib>, String> {
        let anchor = |i: usize| {
            self.anchors
                .get(i)
                .ok_or_else(|| format!("no anchor {i} (have {})", self.anchors.len()))
        };
        match variant {
            Variant::Shift { deltas } => {
                if deltas.len() != self.anchors.len() {
                    return Err(format!(
                        "{} deltas for {} anchors",
                        deltas.len(),
                        self.anchors.len()
                    ));
                }
                self.anchors
                    .iter()
                    .zip(deltas)
                    .map(|(a, &d)| {
                        a.shifted(d)
                            .ok_or_else(|| format!("crib {} shifted before position 0", a.label))
                    })
                    .collect()
            }
            Variant::Split {
                anchor: index,
                at,
                offset,
            } => {
                let a = anchor(*index)?;
                let letters: Vec<char> = a.plaintext.chars().collect();
                if *at == 0 || *at >= letters.len() {
                    return Err(format!("cannot split crib {} at {at}", a.label));
                }
                let head: String = letters[..*at].iter().collect();
                let tail: String = letters[*at..].iter().collect();
                let head = AnchorCrib::new(format!("{}/head", a.label), a.start, head);
                let tail = AnchorCrib::new(format!("{}/tail", a.label), a.start + at, tail)
                    .shifted(*offset)
                    .ok_or_else(|| format!("tail of {} shifted before position 0", a.label))?;
                let mut anchors = self.anchors.clone();
                anchors.splice(*index..=*index, [head, tail]);
                Ok(anchors)
            }
            Variant::Merge { first } => {
                let second = first
                    .checked_add(1)
                    .ok_or_else(|| format!("anchor {first} has no successor"))?;
                let a = anchor(*first)?;
                let b = anchor(second)?;
                let merged = AnchorCrib::new(
                    format!("{}+{}", a.label, b.label),
                    a.start,
                    format!("{}{}", a.plaintext, b.plaintext),
                );
                let mut anchors = self.anchors.clone();
                anchors.splice(*first..=second, [merged]);
                Ok(anchors)
            }
            Variant::Baseline | Variant::Classifier(_) | Variant::Mutation { .. } => {
                Ok(self.anchors.clone())
            }
        }
    }
}
