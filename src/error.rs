use thiserror::Error;

/// Errors from the configuration surface. The numeric core itself never fails.
#[derive(Debug, Error)]
pub enum BayesVizError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, BayesVizError>;
