//! Configuration loading from TOML files.
//!
//! Lookup order for [`Config::discover`]:
//! 1. an explicit path (the CLI `--config` flag)
//! 2. the `$BAYES_VIZ_CONFIG` environment variable
//! 3. built-in defaults (every field is optional)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::conjugate::{BetaBinomial, GroupSummary};
use crate::dataset::DatasetConfig;
use crate::error::Result;
use crate::geometry::Surface;
use crate::params::{NormalUpdateParams, SamplerParams, TAU_RANGE};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normal: NormalUpdateParams,
    pub beta: BetaBinomial,
    pub sampler: SamplerParams,
    pub dataset: DatasetConfig,
    pub surface: SurfaceConfig,
    pub pooling: PoolingConfig,
}

/// Drawing surface and sampling resolution.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
    /// Intervals per 1D curve (the curve has one more point).
    pub curve_samples: usize,
    /// Cells per side of 2D heat maps.
    pub grid_resolution: usize,
}

/// Hierarchical example: group summaries and the population scale.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolingConfig {
    pub tau: f64,
    pub groups: Vec<GroupSummary>,
}

// --- Defaults ---

impl Default for SurfaceConfig {
    fn default() -> Self {
        let surface = Surface::default();
        Self {
            width: surface.width,
            height: surface.height,
            curve_samples: 200,
            grid_resolution: 60,
        }
    }
}

impl SurfaceConfig {
    pub fn surface(&self) -> Surface {
        Surface {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for PoolingConfig {
    fn default() -> Self {
        let group = |mean, sd, n| GroupSummary { mean, sd, n };
        Self {
            tau: 1.0,
            groups: vec![
                group(2.8, 1.2, 6),
                group(4.1, 0.9, 25),
                group(5.6, 1.5, 4),
                group(3.9, 1.1, 12),
                group(6.3, 1.4, 3),
            ],
        }
    }
}

impl PoolingConfig {
    pub fn set_tau(&mut self, v: f64) {
        self.tau = TAU_RANGE.clamp(v);
    }
}

impl Config {
    /// Parses a TOML document; missing sections and fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads `explicit` if given, else `$BAYES_VIZ_CONFIG` if set, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("BAYES_VIZ_CONFIG").ok().map(PathBuf::from));
        match path {
            Some(p) => Self::load(&p),
            None => Ok(Self::default()),
        }
    }

    /// Checks every slider-backed value against its range.
    pub fn validate(&self) -> Result<()> {
        self.normal.validate()?;
        self.beta.validate()?;
        self.sampler.validate()?;
        TAU_RANGE.check("pooling.tau", self.pooling.tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BayesVizError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampler.seed, 42);
        assert_eq!(config.sampler.step_size, 0.15);
        assert_eq!(config.dataset.n, 80);
        assert_eq!(config.surface.grid_resolution, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[sampler]
seed = 7
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.sampler.seed, 7);
        // Other fields should be defaults
        assert_eq!(config.sampler.sample_count, 300);
        assert_eq!(config.normal.prior_sd, 1.0);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[normal]
prior_mean = 1.0
prior_sd = 2.0
data_mean = 3.0
data_sd = 0.5

[beta]
alpha = 2.0
beta = 5.0
successes = 3
failures = 1

[sampler]
seed = 1
step_size = 0.3
sample_count = 1000
burn_in = 200

[dataset]
seed = 9
n = 40

[surface]
width = 800.0
height = 400.0

[pooling]
tau = 0.5
groups = [{ mean = 1.0, sd = 1.0, n = 10 }]
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.normal.data_sd, 0.5);
        assert_eq!(config.beta.posterior_params(), (5.0, 6.0));
        assert_eq!(config.sampler.burn_in, 200);
        assert_eq!(config.dataset.true_log_mean, 1.1);
        assert_eq!(config.surface.surface().width, 800.0);
        assert_eq!(config.pooling.groups.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = Config::from_toml_str("[sampler]\nstep_size = 3.0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(BayesVizError::InvalidParameter { name: "sampler.step_size", .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml_str("[sampler\nseed = 1"),
            Err(BayesVizError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pooling]\ntau = 2.5").unwrap();
        let config = Config::discover(Some(file.path())).unwrap();
        assert_eq!(config.pooling.tau, 2.5);
        assert_eq!(config.pooling.groups.len(), 5);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/bayes-viz.toml")).unwrap_err();
        assert!(matches!(err, BayesVizError::Io(_)));
    }

    #[test]
    fn test_set_tau_clamps() {
        let mut pooling = PoolingConfig::default();
        pooling.set_tau(0.0);
        assert_eq!(pooling.tau, 0.05);
    }
}
