use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradevolveError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("No result: no individual has been successfully evaluated")]
    NoResult,

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl TradevolveError {
    /// Errors an evaluator may raise for a single individual without aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }
}

pub type Result<T> = std::result::Result<T, TradevolveError>;
