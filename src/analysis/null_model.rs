//! Mirrored null samples and their metric distributions.
//!
//! A null sample keeps the accepted skeleton (classifier, family, period and
//! phase per class) and every crib-forced residue, and draws all other slot
//! residues uniformly from `0..26`. Sample `i` is seeded with
//! `counter_rng_seed(master_seed, i)`, so a batch is bit-identical for any
//! worker count or scheduling order.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::propagate::derive;
use crate::classifier::Classifier;
use crate::constants::ALPHABET_LEN;
use crate::error::{Error, Result};
use crate::scoring::{score_all, Metric};
use crate::statistics::{
    compute_quantiles_sorted, counter_rng_seed, empirical_p_value, NULL_SUMMARY_PROBS,
};
use crate::types::CipherText;
use crate::wheel::{Skeleton, WheelSet};

/// One synthetic residue assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullSample {
    /// Sample index within the batch.
    pub index: usize,
    /// Sub-seed the residues were drawn from.
    pub seed: u64,
    /// Wheels with unforced slots filled.
    pub wheels: WheelSet,
}

impl NullSample {
    /// Draw sample `index` from the accepted wheels.
    ///
    /// Classes are filled in order and slots ascending, one draw per slot not
    /// forced by a crib.
    pub fn draw(accepted: &WheelSet, master_seed: u64, index: usize) -> Self {
        let seed = counter_rng_seed(master_seed, index as u64);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut wheels = accepted.clone();
        for class in 0..wheels.wheels().len() {
            if let Some(wheel) = wheels.wheel_mut(class) {
                for slot in 0..wheel.period {
                    if !wheel.is_crib_forced(slot) {
                        wheel.set_residue(slot, rng.gen_range(0..ALPHABET_LEN));
                    }
                }
            }
        }
        Self {
            index,
            seed,
            wheels,
        }
    }

    /// Skeleton of the sample's wheels.
    pub fn skeleton(&self) -> Skeleton {
        self.wheels.skeleton()
    }
}

/// Distribution-level summary of one metric under the null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NullSummary {
    /// Mean.
    pub mean: f64,
    /// Median (Type 2).
    pub median: f64,
    /// 95th percentile (Type 2).
    pub p95: f64,
    /// 99th percentile (Type 2).
    pub p99: f64,
    /// Maximum.
    pub max: f64,
}

/// Null values of one metric, in sample-index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullDistribution {
    /// Metric name.
    pub metric: String,
    /// One value per sample.
    pub values: Vec<f64>,
}

impl NullDistribution {
    /// Wrap precomputed null values.
    pub fn new(metric: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            metric: metric.into(),
            values,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no samples were drawn.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One-sided empirical p-value of `observed`.
    pub fn p_value(&self, observed: f64) -> f64 {
        empirical_p_value(&self.values, observed)
    }

    /// Mean, quantiles and maximum; `None` for an empty distribution.
    pub fn summary(&self) -> Option<NullSummary> {
        if self.values.is_empty() {
            return None;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q = compute_quantiles_sorted(&sorted, &NULL_SUMMARY_PROBS);
        Some(NullSummary {
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            median: q[0],
            p95: q[1],
            p99: q[2],
            max: sorted[sorted.len() - 1],
        })
    }
}

fn score_sample(
    ciphertext: &CipherText,
    classifier: &dyn Classifier,
    candidate: &Skeleton,
    sample: &NullSample,
    metrics: &[&dyn Metric],
) -> Result<Vec<f64>> {
    if let Some((class, expected, found)) = candidate.first_divergence(&sample.skeleton()) {
        return Err(Error::NullSkeletonMismatch {
            sample: sample.index,
            class,
            expected,
            found,
        });
    }
    let plaintext = derive(ciphertext, &sample.wheels, classifier)?;
    let scores = score_all(metrics, &plaintext);
    if let Some(m) = scores.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteMetric {
            metric: metrics[m].name().to_string(),
            sample: Some(sample.index),
        });
    }
    Ok(scores)
}

fn into_distributions(metrics: &[&dyn Metric], rows: Vec<Vec<f64>>) -> Vec<NullDistribution> {
    metrics
        .iter()
        .enumerate()
        .map(|(m, metric)| {
            NullDistribution::new(metric.name(), rows.iter().map(|row| row[m]).collect())
        })
        .collect()
}

/// Score caller-supplied null samples against a candidate skeleton.
///
/// Any sample whose skeleton differs from `candidate` aborts the whole batch
/// with [`Error::NullSkeletonMismatch`].
pub fn score_null_samples(
    ciphertext: &CipherText,
    classifier: &dyn Classifier,
    candidate: &Skeleton,
    samples: &[NullSample],
    metrics: &[&dyn Metric],
) -> Result<Vec<NullDistribution>> {
    if metrics.is_empty() {
        return Err(Error::EmptyMetricSet);
    }

    #[cfg(feature = "parallel")]
    let rows: Result<Vec<Vec<f64>>> = samples
        .par_iter()
        .map(|s| score_sample(ciphertext, classifier, candidate, s, metrics))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Result<Vec<Vec<f64>>> = samples
        .iter()
        .map(|s| score_sample(ciphertext, classifier, candidate, s, metrics))
        .collect();

    Ok(into_distributions(metrics, rows?))
}

/// Draw `n` null samples from `accepted` and score each with every metric.
pub fn null_distributions(
    ciphertext: &CipherText,
    accepted: &WheelSet,
    classifier: &dyn Classifier,
    metrics: &[&dyn Metric],
    n: usize,
    master_seed: u64,
) -> Result<Vec<NullDistribution>> {
    if metrics.is_empty() {
        return Err(Error::EmptyMetricSet);
    }
    accepted.check_classifier(classifier)?;
    let candidate = accepted.skeleton();
    debug!(n, master_seed, classes = candidate.classes.len(), "drawing null samples");

    let run = |i: usize| {
        let sample = NullSample::draw(accepted, master_seed, i);
        score_sample(ciphertext, classifier, &candidate, &sample, metrics)
    };

    #[cfg(feature = "parallel")]
    let rows: Result<Vec<Vec<f64>>> = (0..n).into_par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Result<Vec<Vec<f64>>> = (0..n).map(run).collect();

    let distributions = into_distributions(metrics, rows?);
    info!(n, metrics = distributions.len(), "null batch finished");
    Ok(distributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierFormula;
    use crate::family::Family;
    use crate::wheel::{SlotPolicy, Wheel};

    fn accepted() -> WheelSet {
        let mut wheel = Wheel::new(0, Family::Vigenere, 4, 1);
        wheel.force(1, 9, "T", SlotPolicy::Distinct);
        WheelSet::new("mod(1)", 12, vec![wheel])
    }

    #[test]
    fn test_draw_keeps_forced_slots_and_skeleton() {
        let base = accepted();
        for i in 0..20 {
            let sample = NullSample::draw(&base, 7, i);
            assert_eq!(sample.skeleton(), base.skeleton());
            let wheel = sample.wheels.wheel(0).unwrap();
            assert_eq!(wheel.residue(0), Some(9));
            assert!(wheel.residues().iter().all(|r| r.is_some_and(|v| v < 26)));
        }
    }

    #[test]
    fn test_draw_is_deterministic() {
        let base = accepted();
        assert_eq!(NullSample::draw(&base, 7, 3), NullSample::draw(&base, 7, 3));
        assert_ne!(
            NullSample::draw(&base, 7, 3).seed,
            NullSample::draw(&base, 7, 4).seed
        );
    }

    #[test]
    fn test_summary_of_known_values() {
        let dist = NullDistribution::new("m", (1..=100).map(f64::from).collect());
        let s = dist.summary().unwrap();
        assert!((s.mean - 50.5).abs() < 1e-12);
        assert!((s.median - 50.5).abs() < 1e-12);
        assert_eq!(s.max, 100.0);
        assert!(s.p95 <= s.p99 && s.p99 <= s.max);
        assert!(NullDistribution::new("m", Vec::new()).summary().is_none());
    }

    #[test]
    fn test_empty_metric_set_is_rejected() {
        let ct = CipherText::parse("ABCDEFGHIJKL").unwrap();
        let err = null_distributions(
            &ct,
            &accepted(),
            &ClassifierFormula::Modulo { modulus: 1 },
            &[],
            10,
            1,
        )
        .unwrap_err();
        assert_eq!(err, Error::EmptyMetricSet);
    }
}
