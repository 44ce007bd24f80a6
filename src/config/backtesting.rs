use super::traits::{ensure_non_negative, ensure_unit_interval, ConfigSection};
use crate::engines::evaluation::PortfolioSettings;
use crate::engines::metrics::FitnessMetric;
use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestingConfig {
    pub initial_capital: f64,
    pub commission: f64,
    pub slippage: f64,
    pub position_fraction: f64,
    pub allow_short: bool,
    pub fitness_metric: FitnessMetric,
}

impl Default for BacktestingConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10000.0,
            commission: 0.001,
            slippage: 0.0005,
            position_fraction: 0.1,
            allow_short: true,
            fitness_metric: FitnessMetric::ReturnPct,
        }
    }
}

impl BacktestingConfig {
    pub fn portfolio_settings(&self) -> PortfolioSettings {
        PortfolioSettings {
            initial_capital: self.initial_capital,
            commission: self.commission,
            slippage: self.slippage,
            position_fraction: self.position_fraction,
            allow_short: self.allow_short,
        }
    }
}

impl ConfigSection for BacktestingConfig {
    fn section_name() -> &'static str {
        "backtesting"
    }

    fn validate(&self) -> Result<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(TradevolveError::Configuration(
                "Initial capital must be positive".to_string(),
            ));
        }
        ensure_non_negative(Self::section_name(), "commission", self.commission)?;
        ensure_non_negative(Self::section_name(), "slippage", self.slippage)?;
        ensure_unit_interval(Self::section_name(), "position_fraction", self.position_fraction)?;
        if self.position_fraction == 0.0 {
            return Err(TradevolveError::Configuration(
                "Position fraction must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
