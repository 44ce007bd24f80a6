use crate::engines::metrics::FitnessMetric;
use crate::types::Trade;
use std::collections::HashMap;

/// Objectives derived from closed trades
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitabilityMetrics {
    pub net_profit: f64,
    /// Net profit as a percentage of starting capital
    pub return_pct: f64,
    /// Share of trades closed with a positive net profit, in percent
    pub win_rate: f64,
    /// Gross wins over gross losses; `None` when nothing lost
    pub profit_factor: Option<f64>,
}

impl ProfitabilityMetrics {
    /// `None` when no trade closed, so every trade objective reads as zero
    pub fn from_trades(trades: &[Trade], initial_capital: f64) -> Option<Self> {
        if trades.is_empty() {
            return None;
        }

        let mut gross_win = 0.0;
        let mut gross_loss = 0.0;
        let mut wins = 0usize;
        for trade in trades {
            if trade.profit > 0.0 {
                gross_win += trade.profit;
                wins += 1;
            } else {
                gross_loss -= trade.profit;
            }
        }

        let net_profit = gross_win - gross_loss;
        let return_pct = if initial_capital > 0.0 {
            net_profit / initial_capital * 100.0
        } else {
            0.0
        };

        Some(Self {
            net_profit,
            return_pct,
            win_rate: wins as f64 / trades.len() as f64 * 100.0,
            profit_factor: (gross_loss > 0.0).then(|| gross_win / gross_loss),
        })
    }

    pub fn record(&self, metrics: &mut HashMap<String, f64>) {
        let mut put = |metric: FitnessMetric, value: f64| {
            metrics.insert(metric.key().to_string(), value);
        };
        put(FitnessMetric::NetProfit, self.net_profit);
        put(FitnessMetric::ReturnPct, self.return_pct);
        put(FitnessMetric::WinRate, self.win_rate);
        if let Some(factor) = self.profit_factor {
            put(FitnessMetric::ProfitFactor, factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, ExitReason};
    use approx::assert_relative_eq;

    fn trade(profit: f64) -> Trade {
        Trade {
            entry_bar: 0,
            exit_bar: 1,
            entry_price: 100.0,
            exit_price: 100.0,
            direction: Direction::Long,
            size: 1.0,
            profit,
            exit_reason: ExitReason::Signal,
            fees: 0.0,
        }
    }

    #[test]
    fn test_mixed_trades() {
        let metrics =
            ProfitabilityMetrics::from_trades(&[trade(120.0), trade(-40.0), trade(0.0)], 2000.0)
                .unwrap();

        assert_relative_eq!(metrics.net_profit, 80.0);
        assert_relative_eq!(metrics.return_pct, 4.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.win_rate, 100.0 / 3.0, epsilon = 1e-9);
        assert_eq!(metrics.profit_factor, Some(3.0));
    }

    #[test]
    fn test_only_winners_have_no_profit_factor() {
        let metrics = ProfitabilityMetrics::from_trades(&[trade(10.0)], 1000.0).unwrap();
        assert_eq!(metrics.profit_factor, None);

        let mut map = HashMap::new();
        metrics.record(&mut map);
        assert!(!map.contains_key(FitnessMetric::ProfitFactor.key()));
        assert_eq!(map[FitnessMetric::WinRate.key()], 100.0);
    }

    #[test]
    fn test_no_trades() {
        assert!(ProfitabilityMetrics::from_trades(&[], 1000.0).is_none());
    }
}
