use super::traits::ConfigSection;
use crate::engines::evaluation::StrategyKind;
use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    /// Bar multipliers to search over; more than one adds a timeframe parameter
    pub timeframes: Vec<usize>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::MovingAverageCrossover,
            timeframes: vec![1],
        }
    }
}

impl ConfigSection for StrategyConfig {
    fn section_name() -> &'static str {
        "strategy"
    }

    fn validate(&self) -> Result<()> {
        if self.timeframes.iter().any(|&factor| factor == 0) {
            return Err(TradevolveError::Configuration(
                "Timeframe multipliers must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
