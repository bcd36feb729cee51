/*!
Probability densities evaluated by the visualizations, and the unnormalized log-posterior
targeted by the Metropolis sampler.

The density types are generic over the floating-point precision through
[`num_traits::Float`]. The free functions ([`normal_pdf`], [`lognormal_pdf`], [`beta_pdf`],
[`joint_log_posterior`]) are the `f64` entry points used by the rest of the crate.

Nothing here fails: a scale at or below zero is clamped to [`SCALE_FLOOR`], a point outside a
distribution's support has density `0`, and an infeasible `sigma` has log-posterior `-∞`.

# Examples

```rust
use bayes_viz::distributions::{beta_pdf, lognormal_pdf, normal_pdf};

let peak = normal_pdf(0.0, 0.0, 1.0);
assert!((peak - 0.3989422804014327).abs() < 1e-12);
assert_eq!(lognormal_pdf(-1.0, 0.0, 1.0), 0.0);
assert!((beta_pdf(0.3, 1.0, 1.0) - 1.0).abs() < 1e-10);
```
*/

use num_traits::Float;
use std::f64::consts::PI;

use crate::dataset::SufficientStats;

/// Smallest scale any density is evaluated with.
pub const SCALE_FLOOR: f64 = 0.05;

/// A continuous target known up to a normalizing constant.
pub trait Target {
    /// Returns the log of the unnormalized density at `theta`.
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64;

    /// Whether `theta` lies inside the support. Points outside it are rejected by the
    /// sampler without evaluating [`Target::unnorm_log_prob`].
    fn in_support(&self, _theta: &[f64]) -> bool {
        true
    }
}

/// A univariate density that can be plotted.
pub trait Density<T: Float> {
    /// Evaluates the (normalized) density at `x`.
    fn pdf(&self, x: T) -> T;
}

fn lit<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

fn floor_scale<T: Float>(scale: T) -> T {
    scale.max(lit(SCALE_FLOOR))
}

/// Normal distribution `N(mean, sd²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal<T: Float> {
    pub mean: T,
    pub sd: T,
}

impl<T: Float> Normal<T> {
    pub fn new(mean: T, sd: T) -> Self {
        Self { mean, sd }
    }
}

impl<T: Float> Density<T> for Normal<T> {
    fn pdf(&self, x: T) -> T {
        let sd = floor_scale(self.sd);
        let z = (x - self.mean) / sd;
        (lit::<T>(-0.5) * z * z).exp() / (sd * lit::<T>(2.0 * PI).sqrt())
    }
}

impl Target for Normal<f64> {
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64 {
        let sd = floor_scale(self.sd);
        let z = (theta[0] - self.mean) / sd;
        -0.5 * z * z
    }
}

/// LogNormal distribution: `ln X ~ N(log_mean, log_sd²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormal<T: Float> {
    pub log_mean: T,
    pub log_sd: T,
}

impl<T: Float> LogNormal<T> {
    pub fn new(log_mean: T, log_sd: T) -> Self {
        Self { log_mean, log_sd }
    }
}

impl<T: Float> Density<T> for LogNormal<T> {
    fn pdf(&self, x: T) -> T {
        if x <= T::zero() {
            return T::zero();
        }
        Normal::new(self.log_mean, self.log_sd).pdf(x.ln()) / x
    }
}

/// Beta distribution on the open interval `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta<T: Float> {
    pub alpha: T,
    pub beta: T,
}

impl<T: Float> Beta<T> {
    pub fn new(alpha: T, beta: T) -> Self {
        Self { alpha, beta }
    }

    pub fn mean(&self) -> T {
        let (a, b) = (floor_scale(self.alpha), floor_scale(self.beta));
        a / (a + b)
    }
}

impl<T: Float> Density<T> for Beta<T> {
    fn pdf(&self, x: T) -> T {
        if x <= T::zero() || x >= T::one() {
            return T::zero();
        }
        let (a, b) = (floor_scale(self.alpha), floor_scale(self.beta));
        let log_density =
            (a - T::one()) * x.ln() + (b - T::one()) * (T::one() - x).ln() - ln_beta(a, b);
        log_density.exp()
    }
}

/// Lanczos approximation (g = 7, nine coefficients) of `ln Γ(x)` for `x > 0`.
pub fn ln_gamma<T: Float>(x: T) -> T {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    let half = lit::<T>(0.5);
    if x < half {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = lit::<T>(PI);
        return (pi / (pi * x).sin()).ln() - ln_gamma(T::one() - x);
    }

    let x = x - T::one();
    let mut sum = lit::<T>(COEFFICIENTS[0]);
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum = sum + lit::<T>(c) / (x + lit::<T>(i as f64 + 1.0));
    }
    let t = x + lit::<T>(G) + half;
    half * lit::<T>(2.0 * PI).ln() + (x + half) * t.ln() - t + sum.ln()
}

/// `ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a + b)`.
pub fn ln_beta<T: Float>(a: T, b: T) -> T {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Gaussian density with `sd` clamped to [`SCALE_FLOOR`].
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    Normal::new(mean, sd).pdf(x)
}

/// LogNormal density; `0` for `x <= 0`.
pub fn lognormal_pdf(x: f64, log_mean: f64, log_sd: f64) -> f64 {
    LogNormal::new(log_mean, log_sd).pdf(x)
}

/// Beta density; `0` outside the open interval `(0, 1)`.
pub fn beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    Beta::new(alpha, beta).pdf(x)
}

/// Unnormalized log-posterior of `(mu, sigma)` for LogNormal observations summarized by
/// `stats`, with a standard-Normal prior on `mu` and a standard-HalfNormal prior on `sigma`.
///
/// Returns `-∞` when `sigma <= 0`. Terms constant in `(mu, sigma)` are dropped.
pub fn joint_log_posterior(mu: f64, sigma: f64, stats: &SufficientStats) -> f64 {
    if sigma <= 0.0 || sigma.is_nan() {
        return f64::NEG_INFINITY;
    }
    let n = stats.n as f64;
    // Σ (ln x_i − mu)² expanded over the cached sums.
    let squared_residuals = stats.sum_log_sq - 2.0 * mu * stats.sum_log + n * mu * mu;
    let log_likelihood = -n * libm::log(sigma) - squared_residuals / (2.0 * sigma * sigma);
    let log_prior_mu = -0.5 * mu * mu;
    let log_prior_sigma = -0.5 * sigma * sigma;
    log_likelihood + log_prior_mu + log_prior_sigma
}

/// Unnormalized 1D posterior `N(θ; prior) · N(data_mean; θ, data_sd²)`, the sampled
/// counterpart of the closed-form Normal-Normal update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalProduct {
    pub prior: Normal<f64>,
    pub likelihood: Normal<f64>,
}

impl Target for NormalProduct {
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64 {
        self.prior.unnorm_log_prob(theta) + self.likelihood.unnorm_log_prob(theta)
    }
}

/// The `(mu, sigma)` posterior of the LogNormal model as a sampler target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormalPosterior {
    pub stats: SufficientStats,
}

impl LogNormalPosterior {
    pub fn new(stats: SufficientStats) -> Self {
        Self { stats }
    }
}

impl Target for LogNormalPosterior {
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64 {
        joint_log_posterior(theta[0], theta[1], &self.stats)
    }

    fn in_support(&self, theta: &[f64]) -> bool {
        theta[1] > 0.0
    }
}
