/*!
Posterior predictive checks for the LogNormal model.

For evenly spaced posterior draws `(mu, sigma)` a replicated dataset of the observed size is
simulated from the seeded generator. Each replicate is compared with the observed data on the
log scale using the two-sample Kolmogorov–Smirnov statistic, and the replicated log-means are
collected so the observed log-mean can be placed within their distribution.

The KS statistic and its asymptotic p-value follow *Numerical Recipes* (Third Edition).
*/

use serde::Serialize;

use crate::dataset::SyntheticDataset;
use crate::rng::{Lcg, StandardNormalStream};

/// Outcome of a two-sample KS comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sample KS test; `None` if either sample is empty.
pub fn ks_test(sample_1: &[f64], sample_2: &[f64]) -> Option<KsResult> {
    let statistic = ks_statistic(sample_1, sample_2)?;
    let (n1, n2) = (sample_1.len() as f64, sample_2.len() as f64);
    let effective = (n1 * n2 / (n1 + n2)).sqrt();
    Some(KsResult {
        statistic,
        p_value: qks(effective * statistic),
    })
}

/// Largest distance between the two empirical CDFs; `None` if either sample is empty.
/// `NaN`s sort after every real value.
pub fn ks_statistic(sample_1: &[f64], sample_2: &[f64]) -> Option<f64> {
    if sample_1.is_empty() || sample_2.is_empty() {
        return None;
    }
    let mut a = sample_1.to_vec();
    let mut b = sample_2.to_vec();
    a.sort_unstable_by(f64::total_cmp);
    b.sort_unstable_by(f64::total_cmp);

    let (n, m) = (a.len(), b.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut max_diff: f64 = 0.0;
    while i < n && j < m {
        let x = a[i].min(b[j]);
        if x.is_nan() {
            // Only NaNs remain on both sides; their tails coincide.
            break;
        }
        while i < n && a[i] <= x {
            i += 1;
        }
        while j < m && b[j] <= x {
            j += 1;
        }
        let diff = (i as f64 / n as f64 - j as f64 / m as f64).abs();
        max_diff = max_diff.max(diff);
    }
    Some(max_diff)
}

/// CDF of the Kolmogorov distribution.
fn pks(z: f64) -> f64 {
    if z <= 0.0 {
        return 0.0;
    }
    if z < 1.18 {
        let y = (-1.233_700_550_136_169_7 / (z * z)).exp();
        return 2.256_758_334_191_025
            * (-y.ln()).sqrt()
            * (y + y.powi(9) + y.powi(25) + y.powi(49));
    }
    1.0 - qks(z)
}

/// Complementary CDF of the Kolmogorov distribution.
fn qks(z: f64) -> f64 {
    if z <= 0.0 {
        return 1.0;
    }
    if z < 1.18 {
        return 1.0 - pks(z);
    }
    let x = (-2.0 * z * z).exp();
    2.0 * (x - x.powi(4) + x.powi(9))
}

/// Result of a posterior predictive check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveCheck {
    /// KS statistic of each replicate against the observed log-values.
    pub ks_statistics: Vec<f64>,
    /// Mean log-value of each replicate.
    pub replicated_log_means: Vec<f64>,
    pub observed_log_mean: f64,
    /// Fraction of replicates whose log-mean is at least the observed one.
    pub p_value_log_mean: f64,
}

/// Simulates up to `n_replicates` datasets from draws spread evenly over `samples`
/// (`[mu, sigma]` pairs) and compares each with `data`. Draws with fewer than two
/// coordinates are skipped.
pub fn posterior_predictive_check(
    data: &SyntheticDataset,
    samples: &[Vec<f64>],
    n_replicates: usize,
    seed: u32,
) -> PredictiveCheck {
    let observed: Vec<f64> = data.values().iter().map(|&x| libm::log(x)).collect();
    let observed_log_mean = data.stats().mean_log();
    let n_replicates = n_replicates.min(samples.len());
    let mut normals = StandardNormalStream::new(Lcg::new(seed));

    let mut ks_statistics = Vec::with_capacity(n_replicates);
    let mut replicated_log_means = Vec::with_capacity(n_replicates);
    for r in 0..n_replicates {
        let (mu, sigma) = match samples[r * samples.len() / n_replicates][..] {
            [mu, sigma, ..] => (mu, sigma),
            _ => continue,
        };
        // Simulated on the log scale; exponentiating and taking logs again is the identity.
        let replicate: Vec<f64> = normals
            .by_ref()
            .take(observed.len())
            .map(|z| mu + sigma * z)
            .collect();
        if let Some(d) = ks_statistic(&observed, &replicate) {
            ks_statistics.push(d);
        }
        replicated_log_means.push(replicate.iter().sum::<f64>() / replicate.len().max(1) as f64);
    }

    let p_value_log_mean = if replicated_log_means.is_empty() {
        0.0
    } else {
        replicated_log_means
            .iter()
            .filter(|&&m| m >= observed_log_mean)
            .count() as f64
            / replicated_log_means.len() as f64
    };

    PredictiveCheck {
        ks_statistics,
        replicated_log_means,
        observed_log_mean,
        p_value_log_mean,
    }
}
