//! The fixed synthetic dataset shared by the posterior heat map, the sampler and the
//! predictive checks.
//!
//! The dataset is an explicit immutable value: build it once with
//! [`SyntheticDataset::generate`] at startup and pass it by reference to every consumer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distributions::LogNormalPosterior;
use crate::rng::{Lcg, StandardNormalStream};

/// Generative settings of the synthetic dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub seed: u32,
    pub n: usize,
    pub true_log_mean: f64,
    pub true_log_sd: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seed: 2024,
            n: 80,
            true_log_mean: 1.1,
            true_log_sd: 0.6,
        }
    }
}

/// Sufficient statistics of the LogNormal likelihood: count, `Σ ln x`, `Σ (ln x)²`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SufficientStats {
    pub n: usize,
    pub sum_log: f64,
    pub sum_log_sq: f64,
}

impl SufficientStats {
    /// Accumulates the statistics from already log-transformed observations.
    pub fn from_log_values(logs: impl IntoIterator<Item = f64>) -> Self {
        logs.into_iter().fold(Self::default(), |acc, l| Self {
            n: acc.n + 1,
            sum_log: acc.sum_log + l,
            sum_log_sq: acc.sum_log_sq + l * l,
        })
    }

    /// Sample mean of the log-values, `0` for an empty sample.
    pub fn mean_log(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.sum_log / self.n as f64
    }

    /// Population standard deviation of the log-values.
    pub fn sd_log(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean_log();
        (self.sum_log_sq / self.n as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// A write-once sample of positive values drawn from a LogNormal distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticDataset {
    config: DatasetConfig,
    values: Vec<f64>,
    stats: SufficientStats,
}

impl SyntheticDataset {
    /// Draws `config.n` values `exp(true_log_mean + true_log_sd · z)` where the `z` are
    /// Box-Muller deviates from an [`Lcg`] seeded with `config.seed`.
    pub fn generate(config: &DatasetConfig) -> Self {
        let values: Vec<f64> = StandardNormalStream::new(Lcg::new(config.seed))
            .take(config.n)
            .map(|z| libm::exp(config.true_log_mean + config.true_log_sd * z))
            .collect();
        let stats = SufficientStats::from_log_values(values.iter().map(|&x| libm::log(x)));
        debug!(n = stats.n, seed = config.seed, mean_log = stats.mean_log(), "synthetic dataset built");
        Self {
            config: *config,
            values,
            stats,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn stats(&self) -> &SufficientStats {
        &self.stats
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `(mu, sigma)` posterior of this dataset as a sampler target.
    pub fn posterior(&self) -> LogNormalPosterior {
        LogNormalPosterior::new(self.stats)
    }
}

impl Default for SyntheticDataset {
    fn default() -> Self {
        Self::generate(&DatasetConfig::default())
    }
}
