use super::backtester::Backtester;
use super::portfolio::PortfolioSettings;
use super::strategies::SignalStrategy;
use crate::data::{PriceSeries, SeriesCache};
use crate::engines::metrics::FitnessMetric;
use crate::engines::optimization::{ParameterBounds, ParameterSchema, ParameterVector};
use crate::error::{Result, TradevolveError};
use std::sync::Arc;

/// Scores one parameter vector against a price series.
///
/// Implementations must be deterministic and must not mutate the series;
/// they are called concurrently from the evaluation pool.
pub trait StrategyEvaluator: Send + Sync {
    /// Parameter space the evaluator understands
    fn schema(&self) -> ParameterSchema;

    fn evaluate(&self, vector: &ParameterVector, series: &PriceSeries) -> Result<f64>;
}

type ObjectiveFn = dyn Fn(&[f64], &PriceSeries) -> Result<f64> + Send + Sync;

/// Evaluator backed by a closure
pub struct FnEvaluator {
    schema: ParameterSchema,
    objective: Box<ObjectiveFn>,
}

impl FnEvaluator {
    pub fn new<F>(schema: ParameterSchema, objective: F) -> Self
    where
        F: Fn(&[f64], &PriceSeries) -> Result<f64> + Send + Sync + 'static,
    {
        Self {
            schema,
            objective: Box::new(objective),
        }
    }
}

impl StrategyEvaluator for FnEvaluator {
    fn schema(&self) -> ParameterSchema {
        self.schema.clone()
    }

    fn evaluate(&self, vector: &ParameterVector, series: &PriceSeries) -> Result<f64> {
        (self.objective)(vector.as_slice(), series)
    }
}

/// Backtests a signal strategy and returns one metric as fitness.
///
/// With several timeframes an extra `timeframe_index` parameter selects the
/// bar multiplier; downsampled series are cached across evaluations.
pub struct BacktestEvaluator {
    strategy: Arc<dyn SignalStrategy>,
    backtester: Backtester,
    metric: FitnessMetric,
    timeframes: Vec<usize>,
    schema: ParameterSchema,
    cache: SeriesCache,
}

impl BacktestEvaluator {
    pub fn new(
        strategy: Arc<dyn SignalStrategy>,
        settings: PortfolioSettings,
        metric: FitnessMetric,
        timeframes: Vec<usize>,
    ) -> Result<Self> {
        if timeframes.iter().any(|&factor| factor == 0) {
            return Err(TradevolveError::Configuration(
                "Timeframe multipliers must be positive".to_string(),
            ));
        }

        let mut schema = ParameterSchema::new(strategy.parameters())?;
        if timeframes.len() > 1 {
            schema = schema.with_parameter(ParameterBounds::integer(
                "timeframe_index",
                0,
                timeframes.len() as i64 - 1,
            ))?;
        }

        Ok(Self {
            strategy,
            backtester: Backtester::new(settings),
            metric,
            cache: SeriesCache::new(timeframes.len().max(1) * 4),
            timeframes,
            schema,
        })
    }

    pub fn strategy(&self) -> &dyn SignalStrategy {
        self.strategy.as_ref()
    }

    /// Bar multiplier encoded in `vector`
    pub fn timeframe_for(&self, vector: &ParameterVector) -> usize {
        match self.timeframes.len() {
            0 => 1,
            1 => self.timeframes[0],
            n => {
                let index = vector
                    .as_slice()
                    .last()
                    .map_or(0, |&v| v.round().max(0.0) as usize);
                self.timeframes[index.min(n - 1)]
            }
        }
    }

    fn strategy_params<'a>(&self, vector: &'a ParameterVector) -> &'a [f64] {
        let values = vector.as_slice();
        if self.timeframes.len() > 1 && !values.is_empty() {
            &values[..values.len() - 1]
        } else {
            values
        }
    }
}

impl StrategyEvaluator for BacktestEvaluator {
    fn schema(&self) -> ParameterSchema {
        self.schema.clone()
    }

    fn evaluate(&self, vector: &ParameterVector, series: &PriceSeries) -> Result<f64> {
        let factor = self.timeframe_for(vector);
        let params = self.strategy_params(vector);

        let result = if factor == 1 {
            self.backtester.run(self.strategy.as_ref(), params, series)?
        } else {
            let resampled = self.cache.get_or_downsample(series, factor)?;
            self.backtester.run(self.strategy.as_ref(), params, &resampled)?
        };

        Ok(self.metric.extract(&result.metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::strategies::MovingAverageCrossover;
    use chrono::{Duration, TimeZone, Utc};

    fn series(len: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..len)
            .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin())
            .collect();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceSeries::from_closes("TEST", start, Duration::hours(1), &closes).unwrap()
    }

    #[test]
    fn test_timeframe_parameter_appended() {
        let evaluator = BacktestEvaluator::new(
            Arc::new(MovingAverageCrossover),
            PortfolioSettings::default(),
            FitnessMetric::ReturnPct,
            vec![1, 4],
        )
        .unwrap();

        let schema = evaluator.schema();
        assert_eq!(schema.names(), vec!["fast_period", "slow_period", "timeframe_index"]);
        assert_eq!(evaluator.timeframe_for(&ParameterVector::new(vec![5.0, 20.0, 1.0])), 4);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = BacktestEvaluator::new(
            Arc::new(MovingAverageCrossover),
            PortfolioSettings::default(),
            FitnessMetric::NetProfit,
            vec![1, 2],
        )
        .unwrap();
        let series = series(400);
        let vector = ParameterVector::new(vec![5.0, 30.0, 1.0]);

        let first = evaluator.evaluate(&vector, &series).unwrap();
        let second = evaluator.evaluate(&vector, &series).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_insufficient_bars_is_an_evaluation_error() {
        let evaluator = BacktestEvaluator::new(
            Arc::new(MovingAverageCrossover),
            PortfolioSettings::default(),
            FitnessMetric::ReturnPct,
            vec![],
        )
        .unwrap();
        let err = evaluator
            .evaluate(&ParameterVector::new(vec![5.0, 150.0]), &series(50))
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fn_evaluator_passes_values() {
        let schema = ParameterSchema::new(vec![ParameterBounds::real("x", 0.0, 10.0)]).unwrap();
        let evaluator = FnEvaluator::new(schema, |x, _| Ok(-(x[0] - 7.0).powi(2)));
        let value = evaluator
            .evaluate(&ParameterVector::new(vec![7.0]), &series(5))
            .unwrap();
        assert_eq!(value, 0.0);
    }
}
