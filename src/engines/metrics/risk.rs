use crate::engines::metrics::FitnessMetric;
use std::collections::HashMap;

/// Objectives derived from the bar-by-bar equity curve.
///
/// Ratios use per-bar simple returns with a zero risk-free rate and are not
/// annualized, so they compare runs over the same series only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskMetrics {
    /// Largest peak-to-trough decline, in percent of the peak
    pub max_drawdown_pct: f64,
    /// `None` for a curve with no return variation
    pub sharpe_ratio: Option<f64>,
    /// `None` when no bar lost money
    pub sortino_ratio: Option<f64>,
}

impl RiskMetrics {
    /// `None` for curves shorter than two points
    pub fn from_equity(equity_curve: &[f64]) -> Option<Self> {
        if equity_curve.len() < 2 {
            return None;
        }

        let returns = bar_returns(equity_curve);
        let mean = mean(&returns);
        let deviation = std_dev(&returns, mean);
        let downside = downside_deviation(&returns);

        Some(Self {
            max_drawdown_pct: max_drawdown_pct(equity_curve),
            sharpe_ratio: (deviation > 0.0).then(|| mean / deviation),
            sortino_ratio: (downside > 0.0).then(|| mean / downside),
        })
    }

    pub fn record(&self, metrics: &mut HashMap<String, f64>) {
        metrics.insert(
            FitnessMetric::MaxDrawdownPct.key().to_string(),
            self.max_drawdown_pct,
        );
        if let Some(sharpe) = self.sharpe_ratio {
            metrics.insert(FitnessMetric::SharpeRatio.key().to_string(), sharpe);
        }
        if let Some(sortino) = self.sortino_ratio {
            metrics.insert(FitnessMetric::SortinoRatio.key().to_string(), sortino);
        }
    }
}

fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        // A non-positive peak has no meaningful percentage decline
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak * 100.0);
        }
    }
    worst
}

/// Simple returns, skipping steps that start from non-positive equity
fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Root mean square of the negative returns over all bars
fn downside_deviation(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let squares: f64 = returns.iter().map(|r| r.min(0.0).powi(2)).sum();
    (squares / returns.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_drawdown_and_ratios() {
        let metrics = RiskMetrics::from_equity(&[100.0, 120.0, 90.0, 110.0]).unwrap();

        assert_relative_eq!(metrics.max_drawdown_pct, 25.0, epsilon = 1e-9);
        assert!(metrics.sharpe_ratio.is_some());

        // Returns 0.2, -0.25, 2/9; downside deviation is sqrt(0.0625 / 3)
        let mean = (0.2 - 0.25 + 2.0 / 9.0) / 3.0;
        let expected = mean / (0.0625_f64 / 3.0).sqrt();
        assert_relative_eq!(metrics.sortino_ratio.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_curve_has_no_ratios() {
        let metrics = RiskMetrics::from_equity(&[100.0, 100.0, 100.0]).unwrap();

        assert_eq!(metrics.max_drawdown_pct, 0.0);
        assert_eq!(metrics.sharpe_ratio, None);
        assert_eq!(metrics.sortino_ratio, None);

        let mut map = HashMap::new();
        metrics.record(&mut map);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_non_positive_equity_is_skipped() {
        let metrics = RiskMetrics::from_equity(&[0.0, -10.0, 50.0, 40.0]).unwrap();
        assert_relative_eq!(metrics.max_drawdown_pct, 20.0, epsilon = 1e-9);
        assert!(RiskMetrics::from_equity(&[100.0]).is_none());
    }
}
