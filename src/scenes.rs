/*!
One pure function per visualization: parameters in, drawable geometry out.

Each function rebuilds its scene from scratch, so any UI model can call it on every input
event: reactive re-render, imperative redraw or request/response. [`Workbench`] bundles the
configuration with the write-once dataset for callers that want a single handle.
*/

use serde::Serialize;

use crate::conjugate::{BetaBinomial, NormalPosterior, PartialPooling};
use crate::config::{Config, PoolingConfig, SurfaceConfig};
use crate::core::run_chain;
use crate::dataset::{SufficientStats, SyntheticDataset};
use crate::distributions::{
    beta_pdf, joint_log_posterior, lognormal_pdf, normal_pdf, Normal, NormalProduct,
};
use crate::geometry::{
    build_curve, build_grid, map_points, polyline, AxisRange, GridScale, IntensityGrid, Path,
    Point, Surface,
};
use crate::metropolis_hastings::{MetropolisHastings, UniformProposal};
use crate::params::{NormalUpdateParams, SamplerParams};
use crate::stats::{summarize, KernelDensity, MarginalSummary};
use crate::validation::{posterior_predictive_check, PredictiveCheck};

/// Headroom above the tallest curve.
const Y_HEADROOM: f64 = 1.1;

/// Largest finite value of `f` on the `n + 1` abscissae [`build_curve`] samples.
fn curve_peak(f: impl Fn(f64) -> f64, domain: AxisRange, n: usize) -> f64 {
    let n = n.max(1);
    (0..=n)
        .map(|i| f(domain.lerp(i as f64 / n as f64)))
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalUpdateScene {
    pub domain: AxisRange,
    pub y_max: f64,
    pub prior: Path,
    pub likelihood: Path,
    pub posterior: Path,
    pub summary: NormalPosterior,
}

/// Prior, likelihood and posterior curves of the Normal-Normal update on a shared scale.
pub fn normal_update_scene(
    params: &NormalUpdateParams,
    surface: &Surface,
    samples: usize,
) -> NormalUpdateScene {
    let summary = params.posterior();
    let spans = [
        (params.prior_mean, params.prior_sd),
        (params.data_mean, params.data_sd),
    ];
    let domain = AxisRange::new(
        spans.iter().map(|(m, s)| m - 4.0 * s).fold(f64::INFINITY, f64::min),
        spans.iter().map(|(m, s)| m + 4.0 * s).fold(f64::NEG_INFINITY, f64::max),
    );
    let prior = |x| normal_pdf(x, params.prior_mean, params.prior_sd);
    let likelihood = |x| normal_pdf(x, params.data_mean, params.data_sd);
    let posterior = |x| normal_pdf(x, summary.mean, summary.sd);
    let y_max = Y_HEADROOM
        * [
            curve_peak(prior, domain, samples),
            curve_peak(likelihood, domain, samples),
            curve_peak(posterior, domain, samples),
        ]
        .into_iter()
        .fold(0.0, f64::max);

    NormalUpdateScene {
        domain,
        y_max,
        prior: build_curve(prior, domain, samples, y_max, surface),
        likelihood: build_curve(likelihood, domain, samples, y_max, surface),
        posterior: build_curve(posterior, domain, samples, y_max, surface),
        summary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaBinomialScene {
    pub y_max: f64,
    pub prior: Path,
    pub posterior: Path,
    pub posterior_alpha: f64,
    pub posterior_beta: f64,
    pub mean: f64,
    pub mode: Option<f64>,
    pub successes: u64,
    pub failures: u64,
}

/// Prior and current posterior of the coin-flip example on `(0, 1)`.
pub fn beta_binomial_scene(model: &BetaBinomial, surface: &Surface, samples: usize) -> BetaBinomialScene {
    let domain = AxisRange::new(0.0, 1.0);
    let (a, b) = model.posterior_params();
    let prior = |x| beta_pdf(x, model.alpha, model.beta);
    let posterior = |x| beta_pdf(x, a, b);
    let y_max = Y_HEADROOM * curve_peak(prior, domain, samples).max(curve_peak(posterior, domain, samples));

    BetaBinomialScene {
        y_max,
        prior: build_curve(prior, domain, samples, y_max, surface),
        posterior: build_curve(posterior, domain, samples, y_max, surface),
        posterior_alpha: a,
        posterior_beta: b,
        mean: model.posterior_mean(),
        mode: model.posterior_mode(),
        successes: model.successes,
        failures: model.failures,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogNormalScene {
    pub domain: AxisRange,
    pub y_max: f64,
    pub density: Path,
    /// One rug mark per observation along the baseline.
    pub observations: Vec<Point>,
}

/// The generating LogNormal density with the observed values as a rug.
pub fn lognormal_scene(
    log_mean: f64,
    log_sd: f64,
    data: &SyntheticDataset,
    surface: &Surface,
    samples: usize,
) -> LogNormalScene {
    let largest = data.values().iter().copied().fold(0.0, f64::max);
    let domain = AxisRange::new(0.0, (largest * Y_HEADROOM).max(1.0));
    let density = |x| lognormal_pdf(x, log_mean, log_sd);
    let y_max = Y_HEADROOM * curve_peak(density, domain, samples);
    let observations = data
        .values()
        .iter()
        .map(|&x| Point::new(domain.fraction(x) * surface.width, surface.height))
        .collect();

    LogNormalScene {
        domain,
        y_max,
        density: build_curve(density, domain, samples, y_max, surface),
        observations,
    }
}

/// Axis window around the maximum-likelihood estimate of `(mu, sigma)`.
pub fn posterior_window(stats: &SufficientStats) -> (AxisRange, AxisRange) {
    let n = stats.n.max(1) as f64;
    let (m, s) = (stats.mean_log(), stats.sd_log().max(0.1));
    let mu_half = 5.0 * s / n.sqrt();
    let sigma_half = 5.0 * s / (2.0 * n).sqrt();
    (
        AxisRange::new(m - mu_half, m + mu_half),
        AxisRange::new((s - sigma_half).max(0.01), s + sigma_half),
    )
}

/// Heat map of the unnormalized `(mu, sigma)` posterior.
pub fn posterior_heatmap(data: &SyntheticDataset, resolution: usize) -> IntensityGrid {
    let stats = data.stats();
    let (mu_range, sigma_range) = posterior_window(stats);
    build_grid(
        |mu, sigma| joint_log_posterior(mu, sigma, stats),
        mu_range,
        sigma_range,
        resolution,
        resolution,
        GridScale::Log,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplerScene {
    pub mu_range: AxisRange,
    pub sigma_range: AxisRange,
    pub scatter: Vec<Point>,
    pub trajectory: Path,
    /// Kernel density of the `mu` marginal.
    pub mu_density: Path,
    pub mu: Option<MarginalSummary>,
    pub sigma: Option<MarginalSummary>,
    pub acceptance_rate: f64,
    pub sampling_acceptance_rate: f64,
    pub sample_count: usize,
}

/// Runs the sampler on the LogNormal posterior and lays out its samples.
pub fn sampler_scene(
    data: &SyntheticDataset,
    params: &SamplerParams,
    surface: &Surface,
    samples: usize,
) -> SamplerScene {
    let (mu_range, sigma_range) = posterior_window(data.stats());
    let mut chain = MetropolisHastings::new(
        data.posterior(),
        UniformProposal::new(params.step_size),
        &params.initial_state(),
        params.seed,
    );
    let run = run_chain(&mut chain, params.run_length());

    let mus = run.marginal(0);
    let mu_density = match KernelDensity::new(&mus) {
        Some(kde) => {
            let f = |x| kde.pdf(x);
            let y_max = Y_HEADROOM * curve_peak(f, mu_range, samples);
            build_curve(f, mu_range, samples, y_max, surface)
        }
        None => build_curve(|_| 0.0, mu_range, samples, 1.0, surface),
    };

    SamplerScene {
        mu_range,
        sigma_range,
        scatter: map_points(run.samples.iter().map(Vec::as_slice), mu_range, sigma_range, surface),
        trajectory: polyline(run.trajectory.iter().map(Vec::as_slice), mu_range, sigma_range, surface),
        mu_density,
        mu: summarize(&mus),
        sigma: summarize(&run.marginal(1)),
        acceptance_rate: run.acceptance_rate(),
        sampling_acceptance_rate: run.sampling_acceptance_rate(),
        sample_count: run.samples.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledNormalScene {
    pub domain: AxisRange,
    pub y_max: f64,
    /// Closed-form posterior density.
    pub exact: Path,
    /// Kernel density of the sampled draws.
    pub sampled: Path,
    pub exact_summary: NormalPosterior,
    pub sampled_summary: Option<MarginalSummary>,
    pub acceptance_rate: f64,
}

/// Samples the Normal-Normal posterior with the Metropolis sampler and overlays the draws
/// on the closed-form answer.
pub fn sampled_normal_scene(
    params: &NormalUpdateParams,
    sampler: &SamplerParams,
    surface: &Surface,
    samples: usize,
) -> SampledNormalScene {
    let exact_summary = params.posterior();
    let target = NormalProduct {
        prior: Normal::new(params.prior_mean, params.prior_sd),
        likelihood: Normal::new(params.data_mean, params.data_sd),
    };
    let mut chain = MetropolisHastings::new(
        target,
        UniformProposal::new(sampler.step_size),
        &[params.prior_mean],
        sampler.seed,
    );
    let run = run_chain(&mut chain, sampler.run_length());
    let draws = run.marginal(0);

    let domain = AxisRange::new(
        exact_summary.mean - 4.0 * exact_summary.sd,
        exact_summary.mean + 4.0 * exact_summary.sd,
    );
    let exact = |x| normal_pdf(x, exact_summary.mean, exact_summary.sd);
    let kde = KernelDensity::new(&draws);
    let sampled = |x| kde.as_ref().map_or(0.0, |k| k.pdf(x));
    let y_max = Y_HEADROOM * curve_peak(exact, domain, samples).max(curve_peak(&sampled, domain, samples));

    SampledNormalScene {
        domain,
        y_max,
        exact: build_curve(exact, domain, samples, y_max, surface),
        sampled: build_curve(sampled, domain, samples, y_max, surface),
        exact_summary,
        sampled_summary: summarize(&draws),
        acceptance_rate: run.acceptance_rate(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolingScene {
    pub axis: AxisRange,
    pub fit: PartialPooling,
    /// Per group, a segment from its own mean (top edge) to its pooled estimate (bottom edge).
    pub shrinkage: Vec<[Point; 2]>,
    /// Horizontal position of the population mean.
    pub population_x: f64,
}

/// Shrinkage plot of the hierarchical example.
pub fn pooling_scene(pooling: &PoolingConfig, surface: &Surface) -> PoolingScene {
    let fit = PartialPooling::fit(&pooling.groups, pooling.tau);
    let (lo, hi) = pooling
        .groups
        .iter()
        .map(|g| g.mean)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| (lo.min(m), hi.max(m)));
    let axis = if lo.is_finite() && hi > lo {
        let pad = 0.1 * (hi - lo);
        AxisRange::new(lo - pad, hi + pad)
    } else {
        AxisRange::new(fit.population_mean - 1.0, fit.population_mean + 1.0)
    };
    let to_x = |v: f64| axis.fraction(v) * surface.width;
    let shrinkage = pooling
        .groups
        .iter()
        .zip(&fit.estimates)
        .map(|(g, &e)| [Point::new(to_x(g.mean), 0.0), Point::new(to_x(e), surface.height)])
        .collect();

    PoolingScene {
        axis,
        population_x: to_x(fit.population_mean),
        fit,
        shrinkage,
    }
}

/// Configuration plus the write-once dataset, with one method per scene.
#[derive(Debug)]
pub struct Workbench {
    pub config: Config,
    pub dataset: SyntheticDataset,
}

impl Workbench {
    /// Builds the dataset described by `config.dataset`.
    pub fn new(config: Config) -> Self {
        let dataset = SyntheticDataset::generate(&config.dataset);
        Self { config, dataset }
    }

    fn surface(&self) -> (Surface, &SurfaceConfig) {
        (self.config.surface.surface(), &self.config.surface)
    }

    pub fn normal_update(&self) -> NormalUpdateScene {
        let (surface, cfg) = self.surface();
        normal_update_scene(&self.config.normal, &surface, cfg.curve_samples)
    }

    pub fn sampled_normal(&self) -> SampledNormalScene {
        let (surface, cfg) = self.surface();
        sampled_normal_scene(&self.config.normal, &self.config.sampler, &surface, cfg.curve_samples)
    }

    pub fn beta_binomial(&self) -> BetaBinomialScene {
        let (surface, cfg) = self.surface();
        beta_binomial_scene(&self.config.beta, &surface, cfg.curve_samples)
    }

    pub fn lognormal(&self) -> LogNormalScene {
        let (surface, cfg) = self.surface();
        let d = &self.config.dataset;
        lognormal_scene(d.true_log_mean, d.true_log_sd, &self.dataset, &surface, cfg.curve_samples)
    }

    pub fn heatmap(&self) -> IntensityGrid {
        posterior_heatmap(&self.dataset, self.config.surface.grid_resolution)
    }

    pub fn sampler(&self) -> SamplerScene {
        let (surface, cfg) = self.surface();
        sampler_scene(&self.dataset, &self.config.sampler, &surface, cfg.curve_samples)
    }

    pub fn pooling(&self) -> PoolingScene {
        pooling_scene(&self.config.pooling, &self.config.surface.surface())
    }

    /// Posterior predictive check against a fresh sampler run.
    pub fn predictive_check(&self, replicates: usize) -> PredictiveCheck {
        let params = &self.config.sampler;
        let mut chain = MetropolisHastings::new(
            self.dataset.posterior(),
            UniformProposal::new(params.step_size),
            &params.initial_state(),
            params.seed,
        );
        let run = run_chain(&mut chain, params.run_length());
        posterior_predictive_check(&self.dataset, &run.samples, replicates, params.seed.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conjugate::GroupSummary;
    use approx::assert_abs_diff_eq;

    const SURFACE: Surface = Surface {
        width: 500.0,
        height: 250.0,
    };

    #[test]
    fn normal_scene_curves_share_scale() {
        let scene = normal_update_scene(&NormalUpdateParams::default(), &SURFACE, 100);
        assert_eq!(scene.prior.curve().len(), 101);
        assert_eq!(scene.posterior.curve().len(), 101);
        // The posterior is the narrowest curve, so it reaches highest (smallest y).
        let top = |p: &Path| p.curve().iter().map(|q| q.y).fold(f64::INFINITY, f64::min);
        assert!(top(&scene.posterior) < top(&scene.prior));
        assert!(top(&scene.posterior) > 0.0);
        assert_abs_diff_eq!(scene.summary.mean, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn beta_scene_tracks_observations() {
        let mut model = BetaBinomial::uniform();
        for outcome in [true, true, false, true] {
            model.observe(outcome);
        }
        let scene = beta_binomial_scene(&model, &SURFACE, 50);
        assert_eq!((scene.posterior_alpha, scene.posterior_beta), (4.0, 2.0));
        assert_abs_diff_eq!(scene.mean, 4.0 / 6.0, epsilon = 1e-12);
        assert!(scene.y_max > 0.0);
    }

    #[test]
    fn lognormal_rug_on_baseline() {
        let data = SyntheticDataset::default();
        let scene = lognormal_scene(1.1, 0.6, &data, &SURFACE, 100);
        assert_eq!(scene.observations.len(), data.len());
        assert!(scene.observations.iter().all(|p| p.y == SURFACE.height && p.x <= SURFACE.width));
        assert_eq!(scene.density.points[0].y, SURFACE.height);
    }

    #[test]
    fn heatmap_peak_inside_window() {
        let data = SyntheticDataset::default();
        let grid = posterior_heatmap(&data, 40);
        assert_eq!(grid.cells.dim(), (40, 40));
        let ((r, c), _) = grid
            .cells
            .indexed_iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert!(r > 5 && r < 35 && c > 5 && c < 35, "peak at ({r}, {c})");
    }

    #[test]
    fn sampler_scene_is_reproducible() {
        let data = SyntheticDataset::default();
        let params = SamplerParams::default();
        let a = sampler_scene(&data, &params, &SURFACE, 64);
        let b = sampler_scene(&data, &params, &SURFACE, 64);
        assert_eq!(a, b);
        assert_eq!(a.scatter.len(), 300);
        assert_eq!(a.trajectory.points.len(), 100);
        assert!(!a.trajectory.closed);
    }

    #[test]
    fn sampled_normal_matches_closed_form() {
        let params = NormalUpdateParams {
            prior_mean: 0.0,
            prior_sd: 1.0,
            data_mean: 10.0,
            data_sd: 1.0,
        };
        let sampler = SamplerParams {
            step_size: 1.0,
            sample_count: 5000,
            ..SamplerParams::default()
        };
        let scene = sampled_normal_scene(&params, &sampler, &SURFACE, 64);
        let sampled = scene.sampled_summary.unwrap();
        assert_eq!(scene.exact_summary.mean, 5.0);
        assert_abs_diff_eq!(sampled.mean, 5.0, epsilon = 0.15);
        assert_abs_diff_eq!(sampled.sd, std::f64::consts::FRAC_1_SQRT_2, epsilon = 0.15);
    }

    #[test]
    fn pooling_segments_point_inward() {
        let pooling = PoolingConfig {
            tau: 0.5,
            groups: vec![
                GroupSummary { mean: 0.0, sd: 1.0, n: 4 },
                GroupSummary { mean: 10.0, sd: 1.0, n: 4 },
            ],
        };
        let scene = pooling_scene(&pooling, &SURFACE);
        assert_abs_diff_eq!(scene.population_x, SURFACE.width / 2.0, epsilon = 1e-9);
        let [low_top, low_bottom] = scene.shrinkage[0];
        let [high_top, high_bottom] = scene.shrinkage[1];
        assert!(low_bottom.x > low_top.x);
        assert!(high_bottom.x < high_top.x);
    }

    #[test]
    fn pooling_without_groups() {
        let pooling = PoolingConfig {
            tau: 1.0,
            groups: Vec::new(),
        };
        let scene = pooling_scene(&pooling, &SURFACE);
        assert!(scene.shrinkage.is_empty());
        assert_abs_diff_eq!(scene.population_x, SURFACE.width / 2.0, epsilon = 1e-9);
    }
}
