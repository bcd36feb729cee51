/*!
Closed-form posterior updates.

- [`normal_normal`]: precision-weighted combination of a Normal prior and a Normal data summary.
- [`BetaBinomial`]: a Beta prior updated one Bernoulli observation at a time.
- [`PartialPooling`]: shrinkage of group means toward a precision-weighted population mean
  for a given population scale `tau`.

These are the reference results the sampler output is compared against.

```rust
use bayes_viz::conjugate::{normal_normal, BetaBinomial};

let post = normal_normal(0.0, 1.0, 10.0, 1.0);
assert_eq!(post.mean, 5.0);

let mut bb = BetaBinomial::uniform();
for outcome in [true, true, false, true] {
    bb.observe(outcome);
}
assert_eq!(bb.posterior_params(), (4.0, 2.0));
```
*/

use serde::{Deserialize, Serialize};

use crate::distributions::SCALE_FLOOR;

/// Normal posterior of a Normal-Normal update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalPosterior {
    pub mean: f64,
    pub sd: f64,
    pub precision: f64,
    /// Fraction of the posterior mean contributed by the data, `τ_D / (τ₀ + τ_D)`.
    pub data_weight: f64,
}

/// Combines prior `N(prior_mean, prior_sd²)` with data summary `N(data_mean, data_sd²)`.
/// Scales are clamped to [`SCALE_FLOOR`].
pub fn normal_normal(prior_mean: f64, prior_sd: f64, data_mean: f64, data_sd: f64) -> NormalPosterior {
    let prior_var = prior_sd.max(SCALE_FLOOR).powi(2);
    let data_var = data_sd.max(SCALE_FLOOR).powi(2);
    let prior_precision = 1.0 / prior_var;
    let data_precision = 1.0 / data_var;
    let precision = prior_precision + data_precision;
    let mean = (prior_mean / prior_var + data_mean / data_var) / precision;
    NormalPosterior {
        mean,
        sd: (1.0 / precision).sqrt(),
        precision,
        data_weight: data_precision / precision,
    }
}

/// Beta prior with running success/failure counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetaBinomial {
    pub alpha: f64,
    pub beta: f64,
    pub successes: u64,
    pub failures: u64,
}

impl Default for BetaBinomial {
    fn default() -> Self {
        Self::uniform()
    }
}

impl BetaBinomial {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            successes: 0,
            failures: 0,
        }
    }

    /// The flat `Beta(1, 1)` prior.
    pub fn uniform() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Records one trial.
    pub fn observe(&mut self, success: bool) {
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    /// Forgets all observations, keeping the prior.
    pub fn reset(&mut self) {
        self.successes = 0;
        self.failures = 0;
    }

    pub fn trials(&self) -> u64 {
        self.successes + self.failures
    }

    /// `(α + k, β + n − k)`.
    pub fn posterior_params(&self) -> (f64, f64) {
        (
            self.alpha + self.successes as f64,
            self.beta + self.failures as f64,
        )
    }

    pub fn posterior_mean(&self) -> f64 {
        let (a, b) = self.posterior_params();
        a / (a + b)
    }

    /// Mode of the posterior; `None` unless both parameters exceed one.
    pub fn posterior_mode(&self) -> Option<f64> {
        let (a, b) = self.posterior_params();
        (a > 1.0 && b > 1.0).then(|| (a - 1.0) / (a + b - 2.0))
    }

    pub fn posterior_variance(&self) -> f64 {
        let (a, b) = self.posterior_params();
        let s = a + b;
        a * b / (s * s * (s + 1.0))
    }
}

/// Summary of one group in a hierarchical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub mean: f64,
    pub sd: f64,
    pub n: usize,
}

impl GroupSummary {
    /// Sampling variance of the group mean, `sd² / n`.
    fn mean_variance(&self) -> f64 {
        self.sd.max(SCALE_FLOOR).powi(2) / self.n.max(1) as f64
    }
}

/// Partially pooled estimates for a fixed population scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialPooling {
    pub tau: f64,
    pub population_mean: f64,
    /// One shrunk estimate per group, in input order.
    pub estimates: Vec<f64>,
    /// Per group, the weight on its own mean (1 = no pooling, 0 = complete pooling).
    pub weights: Vec<f64>,
}

impl PartialPooling {
    /// Shrinks each group mean toward the precision-weighted population mean.
    /// `tau` is clamped to [`SCALE_FLOOR`].
    pub fn fit(groups: &[GroupSummary], tau: f64) -> Self {
        let tau = tau.max(SCALE_FLOOR);
        let tau_sq = tau * tau;

        let (weighted_sum, total_weight) = groups.iter().fold((0.0, 0.0), |(s, w), g| {
            let wi = 1.0 / (g.mean_variance() + tau_sq);
            (s + wi * g.mean, w + wi)
        });
        let population_mean = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        };

        let weights: Vec<f64> = groups
            .iter()
            .map(|g| {
                let data_precision = 1.0 / g.mean_variance();
                data_precision / (data_precision + 1.0 / tau_sq)
            })
            .collect();
        let estimates = groups
            .iter()
            .zip(&weights)
            .map(|(g, w)| w * g.mean + (1.0 - w) * population_mean)
            .collect();

        Self {
            tau,
            population_mean,
            estimates,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equal_precisions_average() {
        let post = normal_normal(0.0, 1.0, 10.0, 1.0);
        assert_eq!(post.mean, 5.0);
        assert_abs_diff_eq!(post.sd, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_eq!(post.precision, 2.0);
        assert_eq!(post.data_weight, 0.5);
    }

    #[test]
    fn matches_textbook_formula() {
        let (m0, s0, xb, sd) = (1.5, 2.0, -0.5, 0.5);
        let expected = (m0 / (s0 * s0) + xb / (sd * sd)) / (1.0 / (s0 * s0) + 1.0 / (sd * sd));
        let post = normal_normal(m0, s0, xb, sd);
        assert_abs_diff_eq!(post.mean, expected, epsilon = 1e-12);
        assert!(post.sd < sd && post.sd < s0);
    }

    #[test]
    fn zero_scale_is_clamped() {
        let post = normal_normal(0.0, 0.0, 1.0, 0.0);
        assert!(post.mean.is_finite() && post.sd.is_finite());
        assert_abs_diff_eq!(post.mean, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn beta_binomial_three_one() {
        let mut bb = BetaBinomial::uniform();
        bb.observe(true);
        bb.observe(false);
        bb.observe(true);
        bb.observe(true);
        assert_eq!(bb.posterior_params(), (4.0, 2.0));
        assert_abs_diff_eq!(bb.posterior_mean(), 4.0 / 6.0, epsilon = 1e-12);
        assert_eq!(bb.posterior_mode(), Some(0.75));
        assert_eq!(bb.trials(), 4);
    }

    #[test]
    fn each_observation_moves_one_parameter() {
        let mut bb = BetaBinomial::new(2.0, 3.0);
        let (a0, b0) = bb.posterior_params();
        bb.observe(true);
        assert_eq!(bb.posterior_params(), (a0 + 1.0, b0));
        bb.observe(false);
        assert_eq!(bb.posterior_params(), (a0 + 1.0, b0 + 1.0));
        bb.reset();
        assert_eq!(bb.posterior_params(), (2.0, 3.0));
    }

    #[test]
    fn uniform_prior_has_no_mode() {
        assert_eq!(BetaBinomial::uniform().posterior_mode(), None);
        assert_abs_diff_eq!(BetaBinomial::uniform().posterior_variance(), 1.0 / 12.0, epsilon = 1e-12);
    }

    fn groups() -> Vec<GroupSummary> {
        vec![
            GroupSummary { mean: 2.0, sd: 1.0, n: 4 },
            GroupSummary { mean: 6.0, sd: 1.0, n: 4 },
            GroupSummary { mean: 4.0, sd: 2.0, n: 16 },
        ]
    }

    #[test]
    fn pooling_limits() {
        let nearly_complete = PartialPooling::fit(&groups(), 0.0);
        for e in &nearly_complete.estimates {
            assert_abs_diff_eq!(*e, nearly_complete.population_mean, epsilon = 0.05);
        }
        let none = PartialPooling::fit(&groups(), 1e4);
        for (e, g) in none.estimates.iter().zip(groups()) {
            assert_abs_diff_eq!(*e, g.mean, epsilon = 1e-6);
        }
    }

    #[test]
    fn pooling_shrinks_toward_population() {
        let fit = PartialPooling::fit(&groups(), 1.0);
        assert_abs_diff_eq!(fit.population_mean, 4.0, epsilon = 1e-12);
        assert!(fit.estimates[0] > 2.0 && fit.estimates[0] < 4.0);
        assert!(fit.estimates[1] < 6.0 && fit.estimates[1] > 4.0);
        assert!(fit.weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn pooling_no_groups() {
        let fit = PartialPooling::fit(&[], 1.0);
        assert_eq!(fit.population_mean, 0.0);
        assert!(fit.estimates.is_empty());
    }
}
