//! Scenes built from a TOML configuration, the way the CLI builds them.

use std::io::Write;

use approx::assert_abs_diff_eq;
use bayes_viz::config::Config;
use bayes_viz::scenes::Workbench;

fn workbench(toml: &str) -> Workbench {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{toml}").unwrap();
    let config = Config::discover(Some(file.path())).unwrap();
    config.validate().unwrap();
    Workbench::new(config)
}

#[test]
fn test_surface_and_resolution_from_config() {
    let bench = workbench(
        r#"
[surface]
width = 320.0
height = 160.0
curve_samples = 40
grid_resolution = 12
"#,
    );
    let scene = bench.normal_update();
    // 41 samples plus the two baseline points.
    assert_eq!(scene.posterior.points.len(), 43);
    assert!(scene
        .posterior
        .points
        .iter()
        .all(|p| (0.0..=320.0).contains(&p.x) && (0.0..=160.0).contains(&p.y)));
    assert_eq!(bench.heatmap().cells.dim(), (12, 12));
    assert_eq!(bench.heatmap().to_cells(&bench.config.surface.surface()).len(), 144);
}

#[test]
fn test_beta_counts_from_config() {
    let bench = workbench(
        r#"
[beta]
alpha = 2.0
beta = 2.0
successes = 6
failures = 2
"#,
    );
    let scene = bench.beta_binomial();
    assert_eq!((scene.posterior_alpha, scene.posterior_beta), (8.0, 4.0));
    assert_abs_diff_eq!(scene.mode.unwrap(), 0.7, epsilon = 1e-12);
}

#[test]
fn test_smaller_dataset_changes_sampler_scene() {
    let small = workbench("[dataset]\nn = 20\n");
    let default = workbench("");
    assert_eq!(small.dataset.len(), 20);
    assert_ne!(small.sampler().mu, default.sampler().mu);
}

#[test]
fn test_scenes_serialize_to_json() {
    let bench = workbench("[sampler]\nsample_count = 100\n");
    let sampler = serde_json::to_value(bench.sampler()).unwrap();
    assert_eq!(sampler["sample_count"], 100);
    assert_eq!(sampler["scatter"].as_array().unwrap().len(), 100);
    assert!(sampler["trajectory"]["points"].is_array());

    let heatmap = serde_json::to_value(bench.heatmap()).unwrap();
    assert!(heatmap["cells"].is_object());

    let pooling = serde_json::to_value(bench.pooling()).unwrap();
    assert_eq!(pooling["shrinkage"].as_array().unwrap().len(), 5);
}

#[test]
fn test_predictive_check_runs_from_config() {
    let bench = workbench("");
    let check = bench.predictive_check(20);
    assert_eq!(check.ks_statistics.len(), 20);
    assert!(check.ks_statistics.iter().all(|&d| (0.0..=1.0).contains(&d)));
}
