//! Numerical core of an interactive Bayesian-statistics walkthrough: densities, a seeded
//! Metropolis-Hastings sampler, conjugate updates and the geometry each chart draws.

pub mod config;
pub mod conjugate;
pub mod core;
pub mod dataset;
pub mod distributions;
pub mod error;
pub mod geometry;
pub mod metropolis_hastings;
pub mod params;
pub mod rng;
pub mod scenes;
pub mod stats;
pub mod trace;
pub mod validation;

pub use error::{BayesVizError, Result};
