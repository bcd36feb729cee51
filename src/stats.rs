//! Summaries of sampler output: marginal moments, highest-density intervals and a kernel
//! density estimate that can be handed to the curve builder.

use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use serde::Serialize;

use crate::distributions::normal_pdf;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.lower..=self.upper).contains(&x)
    }
}

/// Moments and a 94% HDI of one marginal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginalSummary {
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
    pub hdi: Interval,
}

/// Probability mass covered by [`MarginalSummary::hdi`].
pub const HDI_MASS: f64 = 0.94;

/// Summarizes `xs`; `None` when the sample is empty or contains `NaN`.
pub fn summarize(xs: &[f64]) -> Option<MarginalSummary> {
    let arr = ArrayView1::from(xs);
    let mean = arr.mean()?;
    let ddof = if xs.len() > 1 { 1.0 } else { 0.0 };
    let min = *arr.min().ok()?;
    let max = *arr.max().ok()?;
    Some(MarginalSummary {
        mean,
        sd: arr.std(ddof),
        min,
        max,
        hdi: hdi(xs, HDI_MASS)?,
    })
}

/// Narrowest interval containing `mass` of the sample, found by sliding a window of
/// `⌈mass · n⌉` sorted points.
pub fn hdi(xs: &[f64], mass: f64) -> Option<Interval> {
    if xs.is_empty() || xs.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len();
    let window = ((mass.clamp(0.0, 1.0) * n as f64).ceil() as usize).clamp(1, n);
    (0..=n - window)
        .map(|i| Interval {
            lower: sorted[i],
            upper: sorted[i + window - 1],
        })
        .min_by(|a, b| a.width().total_cmp(&b.width()))
}

/// Gaussian kernel density estimate with Silverman's rule-of-thumb bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    points: Vec<f64>,
    bandwidth: f64,
}

impl KernelDensity {
    /// `None` for an empty sample.
    pub fn new(points: &[f64]) -> Option<Self> {
        let summary = summarize(points)?;
        let n = points.len() as f64;
        let bandwidth = 1.06 * summary.sd * n.powf(-0.2);
        Some(Self {
            points: points.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Estimated density at `x`. The kernel scale is floored like every other density.
    pub fn pdf(&self, x: f64) -> f64 {
        let total: f64 = self
            .points
            .iter()
            .map(|&p| normal_pdf(x, p, self.bandwidth))
            .sum();
        total / self.points.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Lcg, StandardNormalStream};
    use approx::assert_abs_diff_eq;

    #[test]
    fn summary_of_small_sample() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.mean, 2.5);
        assert_abs_diff_eq!(s.sd, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn empty_and_nan_samples() {
        assert!(summarize(&[]).is_none());
        assert!(summarize(&[1.0, f64::NAN]).is_none());
        assert!(hdi(&[], 0.9).is_none());
        assert!(KernelDensity::new(&[]).is_none());
    }

    #[test]
    fn single_point() {
        let s = summarize(&[3.0]).unwrap();
        assert_eq!(s.sd, 0.0);
        assert_eq!(s.hdi, Interval { lower: 3.0, upper: 3.0 });
    }

    #[test]
    fn hdi_skips_outlier() {
        let xs = [0.0, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 10.0];
        let interval = hdi(&xs, 0.8).unwrap();
        assert_eq!(interval, Interval { lower: 1.0, upper: 1.7 });
    }

    #[test]
    fn hdi_of_normal_sample() {
        let zs: Vec<f64> = StandardNormalStream::new(Lcg::new(3)).take(20_000).collect();
        let interval = hdi(&zs, 0.95).unwrap();
        assert_abs_diff_eq!(interval.lower, -1.96, epsilon = 0.1);
        assert_abs_diff_eq!(interval.upper, 1.96, epsilon = 0.1);
    }

    #[test]
    fn kde_integrates_to_one() {
        let zs: Vec<f64> = StandardNormalStream::new(Lcg::new(8)).take(500).collect();
        let kde = KernelDensity::new(&zs).unwrap();
        let h = 0.01;
        let area: f64 = (0..1400).map(|i| kde.pdf(-7.0 + i as f64 * h) * h).sum();
        assert_abs_diff_eq!(area, 1.0, epsilon = 0.01);
        assert!(kde.bandwidth() > 0.0);
    }
}
