// src/engines/metrics/engine.rs
use crate::engines::metrics::{ProfitabilityMetrics, RiskMetrics};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backtest metric used as the optimization objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    #[default]
    ReturnPct,
    NetProfit,
    SharpeRatio,
    SortinoRatio,
    ProfitFactor,
    WinRate,
    MaxDrawdownPct,
}

impl FitnessMetric {
    /// Key of the metric in a metrics map
    pub fn key(&self) -> &'static str {
        match self {
            Self::ReturnPct => "return_pct",
            Self::NetProfit => "net_profit",
            Self::SharpeRatio => "sharpe_ratio",
            Self::SortinoRatio => "sortino_ratio",
            Self::ProfitFactor => "profit_factor",
            Self::WinRate => "win_rate",
            Self::MaxDrawdownPct => "max_drawdown_pct",
        }
    }

    /// Metric value; absent metrics (e.g. no trades) count as zero
    pub fn extract(&self, metrics: &HashMap<String, f64>) -> f64 {
        metrics.get(self.key()).copied().unwrap_or(0.0)
    }
}

/// Builds the objective map a backtest is scored from
pub struct MetricsEngine {
    initial_capital: f64,
}

impl MetricsEngine {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// Objective values keyed by [`FitnessMetric::key`]
    pub fn calculate_all(&self, trades: &[Trade], equity_curve: &[f64]) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();
        if let Some(profitability) = ProfitabilityMetrics::from_trades(trades, self.initial_capital) {
            profitability.record(&mut metrics);
        }
        if let Some(risk) = RiskMetrics::from_equity(equity_curve) {
            risk.record(&mut metrics);
        }
        metrics
    }
}
