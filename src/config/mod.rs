pub mod backtesting;
pub mod data;
pub mod manager;
pub mod optimizer;
pub mod strategy;
pub mod traits;

pub use backtesting::BacktestingConfig;
pub use data::DataConfig;
pub use manager::{AppConfig, ConfigManager, ENV_PREFIX};
pub use optimizer::{AlgorithmConfig, OptimizerConfig};
pub use strategy::StrategyConfig;
pub use traits::ConfigSection;
