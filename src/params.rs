//! User-adjustable parameters.
//!
//! Each visualization owns one parameter set, mutated only through its own setters (the
//! slider handlers). Setters clamp into the slider range, so downstream math never sees a
//! value the controls could not produce. Derived quantities are recomputed from scratch on
//! every call; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::conjugate::{normal_normal, BetaBinomial, NormalPosterior};
use crate::core::RunLength;
use crate::error::{BayesVizError, Result};

/// Inclusive range of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

pub const MEAN_RANGE: Range = Range { min: -10.0, max: 10.0 };
pub const SD_RANGE: Range = Range { min: 0.1, max: 5.0 };
pub const STEP_SIZE_RANGE: Range = Range { min: 0.01, max: 1.0 };
pub const SAMPLE_COUNT_RANGE: Range = Range { min: 50.0, max: 5000.0 };
pub const BETA_PARAM_RANGE: Range = Range { min: 1.0, max: 30.0 };
pub const TAU_RANGE: Range = Range { min: 0.05, max: 10.0 };

impl Range {
    /// Clamps into the range; `NaN` maps to the lower bound.
    pub fn clamp(&self, v: f64) -> f64 {
        if v.is_nan() {
            return self.min;
        }
        v.clamp(self.min, self.max)
    }

    pub fn contains(&self, v: f64) -> bool {
        (self.min..=self.max).contains(&v)
    }

    /// Fails with [`BayesVizError::InvalidParameter`] when `v` is outside the range.
    pub fn check(&self, name: &'static str, v: f64) -> Result<()> {
        if self.contains(v) {
            Ok(())
        } else {
            Err(BayesVizError::InvalidParameter {
                name,
                value: v,
                reason: format!("expected a value in [{}, {}]", self.min, self.max),
            })
        }
    }
}

/// Prior and data settings of the Normal-Normal update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalUpdateParams {
    pub prior_mean: f64,
    pub prior_sd: f64,
    pub data_mean: f64,
    pub data_sd: f64,
}

impl Default for NormalUpdateParams {
    fn default() -> Self {
        Self {
            prior_mean: 0.0,
            prior_sd: 1.0,
            data_mean: 2.0,
            data_sd: 1.0,
        }
    }
}

impl NormalUpdateParams {
    pub fn set_prior_mean(&mut self, v: f64) {
        self.prior_mean = MEAN_RANGE.clamp(v);
    }

    pub fn set_prior_sd(&mut self, v: f64) {
        self.prior_sd = SD_RANGE.clamp(v);
    }

    pub fn set_data_mean(&mut self, v: f64) {
        self.data_mean = MEAN_RANGE.clamp(v);
    }

    pub fn set_data_sd(&mut self, v: f64) {
        self.data_sd = SD_RANGE.clamp(v);
    }

    pub fn posterior(&self) -> NormalPosterior {
        normal_normal(self.prior_mean, self.prior_sd, self.data_mean, self.data_sd)
    }

    pub fn validate(&self) -> Result<()> {
        MEAN_RANGE.check("normal.prior_mean", self.prior_mean)?;
        SD_RANGE.check("normal.prior_sd", self.prior_sd)?;
        MEAN_RANGE.check("normal.data_mean", self.data_mean)?;
        SD_RANGE.check("normal.data_sd", self.data_sd)
    }
}

/// Clamped setters and validation for the Beta prior.
impl BetaBinomial {
    pub fn set_alpha(&mut self, v: f64) {
        self.alpha = BETA_PARAM_RANGE.clamp(v);
    }

    pub fn set_beta(&mut self, v: f64) {
        self.beta = BETA_PARAM_RANGE.clamp(v);
    }

    pub fn validate(&self) -> Result<()> {
        BETA_PARAM_RANGE.check("beta.alpha", self.alpha)?;
        BETA_PARAM_RANGE.check("beta.beta", self.beta)
    }
}

/// Settings of a sampler run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    pub seed: u32,
    pub step_size: f64,
    pub sample_count: usize,
    /// Steps discarded before retaining samples; independent of `sample_count`.
    pub burn_in: usize,
    pub trajectory_len: usize,
    pub start_mu: f64,
    pub start_sigma: f64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            seed: 42,
            step_size: 0.15,
            sample_count: 300,
            burn_in: 500,
            trajectory_len: 100,
            start_mu: 0.5,
            start_sigma: 1.0,
        }
    }
}

impl SamplerParams {
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    pub fn set_step_size(&mut self, v: f64) {
        self.step_size = STEP_SIZE_RANGE.clamp(v);
    }

    pub fn set_sample_count(&mut self, v: usize) {
        self.sample_count = SAMPLE_COUNT_RANGE.clamp(v as f64) as usize;
    }

    pub fn run_length(&self) -> RunLength {
        RunLength {
            n_collect: self.sample_count,
            n_discard: self.burn_in,
            trajectory_len: self.trajectory_len,
        }
    }

    pub fn initial_state(&self) -> [f64; 2] {
        [self.start_mu, self.start_sigma]
    }

    pub fn validate(&self) -> Result<()> {
        STEP_SIZE_RANGE.check("sampler.step_size", self.step_size)?;
        SAMPLE_COUNT_RANGE.check("sampler.sample_count", self.sample_count as f64)?;
        if self.start_sigma <= 0.0 {
            return Err(BayesVizError::InvalidParameter {
                name: "sampler.start_sigma",
                value: self.start_sigma,
                reason: "the chain must start with sigma > 0".to_string(),
            });
        }
        Ok(())
    }
}
