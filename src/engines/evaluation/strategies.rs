//! Parameterized trading rules the optimizer can tune.
//!
//! A strategy turns a parameter slice and a close series into one target
//! exposure per bar: `1.0` long, `-1.0` short, `0.0` flat.

use super::indicators::{rolling_mean_std, sma};
use crate::engines::optimization::ParameterBounds;
use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub trait SignalStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Searchable parameters, in the order `signals` reads them
    fn parameters(&self) -> Vec<ParameterBounds>;

    fn signals(&self, params: &[f64], closes: &[f64]) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    MovingAverageCrossover,
    MeanReversion,
}

impl StrategyKind {
    pub fn build(&self) -> Arc<dyn SignalStrategy> {
        match self {
            Self::MovingAverageCrossover => Arc::new(MovingAverageCrossover),
            Self::MeanReversion => Arc::new(MeanReversion),
        }
    }
}

fn param(params: &[f64], index: usize, name: &str) -> Result<f64> {
    params.get(index).copied().ok_or_else(|| {
        TradevolveError::Evaluation(format!("Missing parameter '{}' at position {}", name, index))
    })
}

fn period(params: &[f64], index: usize, name: &str) -> Result<usize> {
    let value = param(params, index, name)?.round();
    if value < 1.0 {
        return Err(TradevolveError::Evaluation(format!(
            "Parameter '{}' must be at least 1, got {}",
            name, value
        )));
    }
    Ok(value as usize)
}

fn ensure_bars(closes: &[f64], needed: usize, strategy: &str) -> Result<()> {
    if closes.len() < needed {
        return Err(TradevolveError::Evaluation(format!(
            "{} needs at least {} bars, got {}",
            strategy,
            needed,
            closes.len()
        )));
    }
    Ok(())
}

/// Long while the fast SMA is above the slow SMA, short while below
pub struct MovingAverageCrossover;

impl SignalStrategy for MovingAverageCrossover {
    fn name(&self) -> &'static str {
        "moving_average_crossover"
    }

    fn parameters(&self) -> Vec<ParameterBounds> {
        vec![
            ParameterBounds::integer("fast_period", 2, 50),
            ParameterBounds::integer("slow_period", 10, 200),
        ]
    }

    fn signals(&self, params: &[f64], closes: &[f64]) -> Result<Vec<f64>> {
        let fast_period = period(params, 0, "fast_period")?;
        let slow_period = period(params, 1, "slow_period")?;
        if fast_period >= slow_period {
            return Err(TradevolveError::Evaluation(format!(
                "fast_period ({}) must be below slow_period ({})",
                fast_period, slow_period
            )));
        }
        ensure_bars(closes, slow_period + 1, self.name())?;

        let fast = sma(closes, fast_period)?;
        let slow = sma(closes, slow_period)?;

        Ok(fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) if f > s => 1.0,
                (Some(f), Some(s)) if f < s => -1.0,
                _ => 0.0,
            })
            .collect())
    }
}

/// Fade z-score extremes of the close against its rolling mean
pub struct MeanReversion;

impl SignalStrategy for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn parameters(&self) -> Vec<ParameterBounds> {
        vec![
            ParameterBounds::integer("lookback", 5, 100),
            ParameterBounds::real("entry_z", 0.5, 3.0),
            ParameterBounds::real("exit_z", 0.0, 1.5),
        ]
    }

    fn signals(&self, params: &[f64], closes: &[f64]) -> Result<Vec<f64>> {
        let lookback = period(params, 0, "lookback")?;
        let entry_z = param(params, 1, "entry_z")?;
        let exit_z = param(params, 2, "exit_z")?;
        ensure_bars(closes, lookback + 1, self.name())?;

        let (mean, std) = rolling_mean_std(closes, lookback)?;

        let mut state = 0.0;
        let mut signals = Vec::with_capacity(closes.len());
        for ((close, mean), std) in closes.iter().zip(&mean).zip(&std) {
            let z = match (mean, std) {
                (Some(m), Some(s)) if *s > 0.0 => Some((close - m) / s),
                (Some(_), Some(_)) => Some(0.0),
                _ => None,
            };

            if let Some(z) = z {
                if state == 0.0 {
                    if z < -entry_z {
                        state = 1.0;
                    } else if z > entry_z {
                        state = -1.0;
                    }
                } else if state > 0.0 && z > -exit_z {
                    state = 0.0;
                } else if state < 0.0 && z < exit_z {
                    state = 0.0;
                }
            }
            signals.push(state);
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossover_follows_trend() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let signals = MovingAverageCrossover.signals(&[3.0, 10.0], &closes).unwrap();

        assert_eq!(signals.len(), closes.len());
        assert_eq!(signals[5], 0.0);
        assert!(signals[20..].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_crossover_rejects_inverted_periods() {
        let closes = vec![100.0; 300];
        assert!(MovingAverageCrossover.signals(&[20.0, 20.0], &closes).is_err());
        assert!(MovingAverageCrossover.signals(&[5.0, 50.0], &closes[..30]).is_err());
    }

    #[test]
    fn test_mean_reversion_enters_and_exits() {
        let mut closes = vec![100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0];
        closes.push(90.0); // sharp drop
        closes.extend([100.0, 101.0]);

        let signals = MeanReversion.signals(&[5.0, 1.0, 0.0], &closes).unwrap();
        assert_eq!(signals[7], 1.0);
        assert_eq!(signals[9], 0.0);
    }

    #[test]
    fn test_kind_builds_strategy() {
        assert_eq!(StrategyKind::MeanReversion.build().parameters().len(), 3);
        assert_eq!(
            StrategyKind::MovingAverageCrossover.build().name(),
            "moving_average_crossover"
        );
    }
}
