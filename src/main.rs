use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use bayes_viz::config::Config;
use bayes_viz::scenes::Workbench;
use bayes_viz::trace::TraceAnimation;

#[derive(Parser)]
#[command(
    name = "bayes-viz",
    version,
    about = "Builds the data behind each chart of the Bayesian walkthrough and prints it as JSON"
)]
struct Cli {
    /// TOML configuration file (falls back to $BAYES_VIZ_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prior, likelihood and posterior of the Normal-Normal update
    Normal {
        #[arg(long, allow_negative_numbers = true)]
        prior_mean: Option<f64>,
        #[arg(long)]
        prior_sd: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        data_mean: Option<f64>,
        #[arg(long)]
        data_sd: Option<f64>,

        /// Overlay a sampler run on the closed-form posterior
        #[arg(long)]
        sampled: bool,
    },

    /// Beta-Binomial coin example
    Beta {
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(long)]
        beta: Option<f64>,

        /// Observed flips, e.g. "HHTH" (H = success, T = failure)
        #[arg(long, default_value = "")]
        flips: String,
    },

    /// Generating LogNormal density with the synthetic observations
    Lognormal,

    /// Heat map of the (mu, sigma) posterior
    Heatmap {
        /// Cells per side
        #[arg(long)]
        resolution: Option<usize>,

        /// Emit drawable rectangles instead of the raw grid
        #[arg(long)]
        cells: bool,
    },

    /// Metropolis-Hastings run on the (mu, sigma) posterior
    Sample {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        step_size: Option<f64>,
        #[arg(long)]
        samples: Option<usize>,
    },

    /// Partial pooling across groups
    Pooling {
        #[arg(long)]
        tau: Option<f64>,
    },

    /// Posterior predictive check of the LogNormal model
    Check {
        #[arg(long, default_value_t = 50)]
        replicates: usize,
    },

    /// Decorative trace animation frames
    Trace {
        #[arg(long, default_value_t = 100)]
        ticks: usize,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        centre: f64,
        #[arg(long, default_value_t = 0.5)]
        jitter: f64,
    },
}

fn emit(value: &impl Serialize, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::discover(cli.config.as_deref()).context("failed to load config")?;

    // Flag overrides go through the clamping setters, like slider input.
    match &cli.command {
        Commands::Normal {
            prior_mean,
            prior_sd,
            data_mean,
            data_sd,
            ..
        } => {
            let p = &mut config.normal;
            if let Some(v) = *prior_mean {
                p.set_prior_mean(v);
            }
            if let Some(v) = *prior_sd {
                p.set_prior_sd(v);
            }
            if let Some(v) = *data_mean {
                p.set_data_mean(v);
            }
            if let Some(v) = *data_sd {
                p.set_data_sd(v);
            }
        }
        Commands::Beta { alpha, beta, flips } => {
            let b = &mut config.beta;
            if let Some(v) = *alpha {
                b.set_alpha(v);
            }
            if let Some(v) = *beta {
                b.set_beta(v);
            }
            for c in flips.chars() {
                match c.to_ascii_uppercase() {
                    'H' => b.observe(true),
                    'T' => b.observe(false),
                    other => bail!("unknown flip {other:?}, expected H or T"),
                }
            }
        }
        Commands::Heatmap { resolution, .. } => {
            if let Some(r) = resolution {
                config.surface.grid_resolution = (*r).max(1);
            }
        }
        Commands::Sample {
            seed,
            step_size,
            samples,
        } => {
            let s = &mut config.sampler;
            if let Some(v) = *seed {
                s.set_seed(v);
            }
            if let Some(v) = *step_size {
                s.set_step_size(v);
            }
            if let Some(v) = *samples {
                s.set_sample_count(v);
            }
        }
        Commands::Pooling { tau } => {
            if let Some(v) = *tau {
                config.pooling.set_tau(v);
            }
        }
        Commands::Lognormal | Commands::Check { .. } | Commands::Trace { .. } => {}
    }
    config.validate().context("invalid configuration")?;

    let bench = Workbench::new(config);
    info!(observations = bench.dataset.len(), "dataset ready");

    match cli.command {
        Commands::Normal { sampled: false, .. } => emit(&bench.normal_update(), cli.compact),
        Commands::Normal { sampled: true, .. } => emit(&bench.sampled_normal(), cli.compact),
        Commands::Beta { .. } => emit(&bench.beta_binomial(), cli.compact),
        Commands::Lognormal => emit(&bench.lognormal(), cli.compact),
        Commands::Heatmap { cells: false, .. } => emit(&bench.heatmap(), cli.compact),
        Commands::Heatmap { cells: true, .. } => {
            let surface = bench.config.surface.surface();
            emit(&bench.heatmap().to_cells(&surface), cli.compact)
        }
        Commands::Sample { .. } => emit(&bench.sampler(), cli.compact),
        Commands::Pooling { .. } => emit(&bench.pooling(), cli.compact),
        Commands::Check { replicates } => emit(&bench.predictive_check(replicates), cli.compact),
        Commands::Trace {
            ticks,
            centre,
            jitter,
        } => {
            let mut trace = TraceAnimation::new(centre, jitter, ticks.max(1));
            let frames: Vec<f64> = (0..ticks).map(|_| trace.tick()).collect();
            emit(&frames, cli.compact)
        }
    }
}
