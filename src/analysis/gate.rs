//! Significance gate with bounded family-wise error rate.
//!
//! Each metric gets a one-sided empirical p-value against its null
//! distribution. The p-values are Holm-adjusted across metrics, and the gate
//! passes only when every adjusted p-value is strictly below the
//! pre-registered threshold.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::null_model::{null_distributions, NullDistribution, NullSummary};
use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::scoring::Metric;
use crate::statistics::holm_adjust;
use crate::types::{CipherText, DerivedPlaintext};
use crate::wheel::{Skeleton, WheelSet};

/// Per-metric line of a gate decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDecision {
    /// Metric name.
    pub metric: String,
    /// Candidate's score.
    pub observed: f64,
    /// Empirical p-value.
    pub raw_p: f64,
    /// Holm-adjusted p-value.
    pub adjusted_p: f64,
    /// `adjusted_p < alpha`.
    pub passed: bool,
    /// Null distribution summary, absent for an empty null.
    pub null_summary: Option<NullSummary>,
}

/// Audit record of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Threshold on adjusted p-values.
    pub alpha: f64,
    /// Null samples per metric.
    pub samples: usize,
    /// Master seed of the null batch, when the batch was drawn here.
    pub master_seed: Option<u64>,
    /// Skeleton the nulls mirrored, when known.
    pub skeleton: Option<Skeleton>,
    /// One entry per metric, in the order supplied.
    pub metrics: Vec<MetricDecision>,
    /// Every metric passed.
    pub passed: bool,
}

impl GateDecision {
    /// Decision line for `metric`.
    pub fn metric(&self, metric: &str) -> Option<&MetricDecision> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Evaluate observed scores against precomputed null distributions.
///
/// `observed[i]` is compared against `nulls[i]`. A NaN or infinite value,
/// observed or null, fails with [`Error::NonFiniteMetric`].
pub fn evaluate_gate(
    observed: &[f64],
    nulls: &[NullDistribution],
    alpha: f64,
) -> Result<GateDecision> {
    if nulls.is_empty() {
        return Err(Error::EmptyMetricSet);
    }
    if observed.len() != nulls.len() {
        return Err(Error::LengthMismatch {
            expected: nulls.len(),
            found: observed.len(),
        });
    }

    for (&o, null) in observed.iter().zip(nulls) {
        if !o.is_finite() {
            return Err(Error::NonFiniteMetric {
                metric: null.metric.clone(),
                sample: None,
            });
        }
        if let Some(sample) = null.values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteMetric {
                metric: null.metric.clone(),
                sample: Some(sample),
            });
        }
    }

    let raw: Vec<f64> = observed
        .iter()
        .zip(nulls)
        .map(|(&o, null)| null.p_value(o))
        .collect();
    let adjusted = holm_adjust(&raw);

    let metrics: Vec<MetricDecision> = nulls
        .iter()
        .enumerate()
        .map(|(i, null)| MetricDecision {
            metric: null.metric.clone(),
            observed: observed[i],
            raw_p: raw[i],
            adjusted_p: adjusted[i],
            passed: adjusted[i] < alpha,
            null_summary: null.summary(),
        })
        .collect();
    let passed = metrics.iter().all(|m| m.passed);

    Ok(GateDecision {
        alpha,
        samples: nulls.iter().map(NullDistribution::len).min().unwrap_or(0),
        master_seed: None,
        skeleton: None,
        metrics,
        passed,
    })
}

/// Score the candidate, draw the null batch and evaluate the gate.
pub fn run_gate(
    ciphertext: &CipherText,
    accepted: &WheelSet,
    classifier: &dyn Classifier,
    candidate: &DerivedPlaintext,
    metrics: &[&dyn Metric],
    config: &Config,
) -> Result<GateDecision> {
    config
        .validate()
        .map_err(|message| Error::InvalidConfig { message })?;
    let observed: Vec<f64> = metrics.iter().map(|m| m.score(candidate)).collect();
    if let Some(i) = observed.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteMetric {
            metric: metrics[i].name().to_string(),
            sample: None,
        });
    }
    let nulls = null_distributions(
        ciphertext,
        accepted,
        classifier,
        metrics,
        config.null_samples,
        config.master_seed,
    )?;

    let mut decision = evaluate_gate(&observed, &nulls, config.gate_alpha)?;
    decision.master_seed = Some(config.master_seed);
    decision.skeleton = Some(accepted.skeleton());

    for m in &decision.metrics {
        info!(
            metric = %m.metric,
            observed = m.observed,
            raw_p = m.raw_p,
            adjusted_p = m.adjusted_p,
            passed = m.passed,
            "gate metric"
        );
    }
    if decision.passed {
        info!(alpha = decision.alpha, "gate passed");
    } else {
        warn!(alpha = decision.alpha, "gate failed");
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_four_null(metric: &str) -> NullDistribution {
        // 3 of 1000 at or above 10.0
        let mut values = vec![1.0; 997];
        values.extend([10.0, 11.0, 12.0]);
        NullDistribution::new(metric, values)
    }

    #[test]
    fn test_two_metrics_top_four_pass() {
        let nulls = vec![top_four_null("coverage"), top_four_null("function_words")];
        let decision = evaluate_gate(&[10.0, 10.0], &nulls, 0.01).unwrap();
        let m = decision.metric("coverage").unwrap();
        assert!((m.raw_p - 4.0 / 1001.0).abs() < 1e-12);
        assert!((m.adjusted_p - 8.0 / 1001.0).abs() < 1e-12);
        assert!(decision.passed);
        assert_eq!(decision.samples, 1000);
    }

    #[test]
    fn test_gate_fails_when_one_metric_fails() {
        let nulls = vec![top_four_null("a"), top_four_null("b")];
        let decision = evaluate_gate(&[10.0, 0.5], &nulls, 0.01).unwrap();
        assert!(decision.metric("a").unwrap().passed);
        assert!(!decision.metric("b").unwrap().passed);
        assert!(!decision.passed);
    }

    #[test]
    fn test_threshold_is_strict() {
        // p = 1/2 exactly equals alpha
        let nulls = vec![NullDistribution::new("m", vec![0.0])];
        let decision = evaluate_gate(&[1.0], &nulls, 0.5).unwrap();
        assert_eq!(decision.metrics[0].raw_p, 0.5);
        assert!(!decision.passed);
    }

    #[test]
    fn test_non_finite_observed_is_rejected() {
        let nulls = vec![NullDistribution::new("m", vec![0.5; 1000])];
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                evaluate_gate(&[bad], &nulls, 0.01),
                Err(Error::NonFiniteMetric {
                    metric: "m".to_string(),
                    sample: None
                })
            );
        }
    }

    #[test]
    fn test_non_finite_null_value_is_rejected() {
        let mut values = vec![0.5; 10];
        values[4] = f64::NAN;
        let nulls = vec![top_four_null("a"), NullDistribution::new("b", values)];
        assert_eq!(
            evaluate_gate(&[10.0, 1.0], &nulls, 0.01),
            Err(Error::NonFiniteMetric {
                metric: "b".to_string(),
                sample: Some(4)
            })
        );
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(evaluate_gate(&[], &[], 0.01), Err(Error::EmptyMetricSet));
        let nulls = vec![top_four_null("a")];
        assert!(matches!(
            evaluate_gate(&[1.0, 2.0], &nulls, 0.01),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
