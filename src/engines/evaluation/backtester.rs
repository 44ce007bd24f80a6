use crate::{
    data::PriceSeries,
    engines::evaluation::{
        portfolio::{Portfolio, PortfolioSettings},
        strategies::SignalStrategy,
    },
    engines::metrics::MetricsEngine,
    error::{Result, TradevolveError},
    types::BacktestResult,
};

pub struct Backtester {
    settings: PortfolioSettings,
}

impl Backtester {
    pub fn new(settings: PortfolioSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PortfolioSettings {
        &self.settings
    }

    /// Simulate `strategy` with `params` bar by bar over the closes of `series`
    pub fn run(
        &self,
        strategy: &dyn SignalStrategy,
        params: &[f64],
        series: &PriceSeries,
    ) -> Result<BacktestResult> {
        let closes = series.closes();
        let signals = strategy.signals(params, &closes)?;
        if signals.len() != closes.len() {
            return Err(TradevolveError::Evaluation(format!(
                "{} produced {} signals for {} bars",
                strategy.name(),
                signals.len(),
                closes.len()
            )));
        }

        let mut portfolio = Portfolio::with_settings(self.settings);

        for (i, (&signal, &price)) in signals.iter().zip(&closes).enumerate() {
            portfolio.process_bar(i, signal, price)?;
        }
        if let Some(&last_price) = closes.last() {
            portfolio.finish(closes.len() - 1, last_price)?;
        }

        let metrics = MetricsEngine::new(self.settings.initial_capital)
            .calculate_all(portfolio.get_trades(), portfolio.get_equity_curve());

        Ok(BacktestResult {
            metrics,
            trades: portfolio.get_trades().to_vec(),
            equity_curve: portfolio.get_equity_curve().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::strategies::MovingAverageCrossover;
    use crate::types::ExitReason;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_backtester() {
        // Simple price data that trends upward
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = PriceSeries::from_closes("TEST", start, Duration::hours(1), &closes).unwrap();

        let backtester = Backtester::new(PortfolioSettings::default());
        let result = backtester
            .run(&MovingAverageCrossover, &[2.0, 10.0], &series)
            .unwrap();

        // The long opened after warmup is closed on the last bar
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::EndOfData);
        assert!(result.metrics["return_pct"] > 0.0);
        assert_eq!(result.equity_curve.len(), closes.len() + 1);
    }
}
