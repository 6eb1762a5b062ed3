//! Falsification runs over the reference instance.
//!
//! The counts below are properties of the reference ciphertext and anchors
//! under the default configuration; a change in any of them means the
//! builder's search order or feasibility rules changed.

use anchor_wheel::output::format_falsification;
use anchor_wheel::{
    AnchorCrib, CipherText, ClassifierFormula, Digest, FalsificationHarness, Solver, Variant,
    VariantAxis,
};

fn harness() -> FalsificationHarness {
    Solver::new()
        .falsification(&CipherText::reference(), &AnchorCrib::reference_set())
        .unwrap()
}

// =============================================================================
// CLASSIFIER AXIS
// =============================================================================

#[test]
fn classifier_sweep_rejects_only_mod_two() {
    let report = harness().run(&Variant::classifier_sweep());
    let tally = report.tally(VariantAxis::Classifier);
    assert_eq!(tally.total, 24);
    assert_eq!(tally.feasible, 23);

    let infeasible: Vec<&Variant> = report
        .records
        .iter()
        .filter(|r| !r.feasible)
        .map(|r| &r.variant)
        .collect();
    assert_eq!(
        infeasible,
        vec![&Variant::Classifier(ClassifierFormula::Modulo { modulus: 2 })]
    );
}

#[test]
fn baseline_is_feasible_but_not_publishable() {
    let record = harness().run_variant(&Variant::Baseline);
    assert!(record.feasible);
    assert!(!record.fully_resolved);
    assert!(!record.round_trip_ok);
    assert!(!record.digest_match);
}

// =============================================================================
// MUTATION AXIS
// =============================================================================

#[test]
fn no_single_letter_mutation_survives() {
    let harness = harness();
    let plaintext = harness.accepted_plaintext().unwrap();
    let variants = Variant::mutations(plaintext, &[(21, 38), (40, 43)]);
    assert_eq!(variants.len(), 550);

    let report = harness.run(&variants);
    let tally = report.tally(VariantAxis::Mutation);
    assert_eq!(tally.total, 550);
    assert_eq!(tally.feasible, 0);
    assert_eq!(tally.round_trip_ok, 0);
    assert!(report.records.iter().all(|r| r.reason.is_some()));
}

#[test]
fn mutation_outside_its_span_is_infeasible() {
    let record = harness().run_variant(&Variant::Mutation {
        start: 21,
        end: 24,
        position: 30,
        letter: 0,
    });
    assert!(!record.feasible);
    assert!(record.reason.unwrap().contains("outside span"));
}

#[test]
fn mutation_over_unresolved_span_is_infeasible() {
    let record = harness().run_variant(&Variant::Mutation {
        start: 9,
        end: 12,
        position: 10,
        letter: 0,
    });
    assert!(!record.feasible);
    assert!(record.reason.unwrap().contains("not fully resolved"));
}

// =============================================================================
// ANCHOR-BOUNDARY AXIS
// =============================================================================

#[test]
fn joint_shift_grid_counts() {
    let report = harness().run(&Variant::anchor_shift_grid(4, 1));
    let tally = report.tally(VariantAxis::AnchorBoundary);
    assert_eq!(tally.total, 80);
    assert_eq!(tally.feasible, 35);
}

#[test]
fn single_shifts_into_a_neighbour_conflict() {
    let report = harness().run(&Variant::single_shifts(4, 1));
    let feasible: Vec<bool> = report.records.iter().map(|r| r.feasible).collect();
    // anchor 0 -1, +1; anchor 1 -1, +1; ...
    assert_eq!(
        feasible,
        vec![true, false, false, true, true, false, false, true]
    );
    for record in report.records.iter().filter(|r| !r.feasible) {
        assert!(record.reason.as_ref().unwrap().contains("disagree"));
    }
}

#[test]
fn merging_adjacent_anchors_is_the_baseline() {
    let harness = harness();
    let merged = harness.run_variant(&Variant::Merge { first: 0 });
    let baseline = harness.run_variant(&Variant::Baseline);
    assert!(merged.feasible);
    assert_eq!(merged.round_trip_ok, baseline.round_trip_ok);
}

#[test]
fn split_with_zero_offset_keeps_feasibility() {
    let harness = harness();
    let record = harness.run_variant(&Variant::Split {
        anchor: 1,
        at: 5,
        offset: 0,
    });
    assert!(record.feasible);

    let bad = harness.run_variant(&Variant::Split {
        anchor: 1,
        at: 0,
        offset: 0,
    });
    assert!(!bad.feasible);
}

#[test]
fn merge_without_a_successor_is_recorded() {
    let harness = harness();
    let last = harness.run_variant(&Variant::Merge { first: 3 });
    assert!(!last.feasible);
    assert!(last.reason.unwrap().contains("no anchor 4"));

    let record = harness.run_variant(&Variant::Merge { first: usize::MAX });
    assert!(!record.feasible);
    assert!(record.reason.unwrap().contains("has no successor"));
}

#[test]
fn shift_with_wrong_arity_is_recorded() {
    let record = harness().run_variant(&Variant::Shift { deltas: vec![1] });
    assert!(!record.feasible);
    assert!(record.reason.unwrap().contains("1 deltas for 4 anchors"));
}

// =============================================================================
// REPORTING
// =============================================================================

#[test]
fn pinned_digest_is_checked_on_every_run() {
    let solver = Solver::new().expected_digest(Digest::of_text("NOT THE PLAINTEXT"));
    let harness = solver
        .falsification(&CipherText::reference(), &AnchorCrib::reference_set())
        .unwrap();
    let report = harness.run(&[Variant::Baseline, Variant::Merge { first: 2 }]);
    assert!(report.records.iter().all(|r| !r.digest_match));
}

#[test]
fn frequency_table_lists_each_axis() {
    let harness = harness();
    let mut variants = vec![Variant::Baseline];
    variants.extend(Variant::classifier_sweep());
    variants.extend(Variant::single_shifts(4, 1));
    let report = harness.run(&variants);

    let axes: Vec<VariantAxis> = report.table().iter().map(|t| t.axis).collect();
    assert_eq!(
        axes,
        vec![
            VariantAxis::Baseline,
            VariantAxis::Classifier,
            VariantAxis::AnchorBoundary
        ]
    );
    let output = format_falsification(&report);
    assert!(output.contains("23 of 24"));
    assert_eq!(report.feasible().count(), 1 + 23 + 4);
}
