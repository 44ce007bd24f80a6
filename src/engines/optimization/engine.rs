use super::convergence::{ConvergenceMonitor, TerminationReason};
use super::fitness::Evaluation;
use super::hall_of_fame::HallOfFame;
use super::parameters::{ParameterSchema, ParameterVector};
use super::population::Population;
use super::progress::ProgressCallback;
use super::run_state::{EnginePhase, RunState};
use super::variation::{VariationContext, VariationOperator};
use crate::config::{ConfigSection, OptimizerConfig};
use crate::data::PriceSeries;
use crate::engines::evaluation::StrategyEvaluator;
use crate::error::{Result, TradevolveError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal, checked by the engine between states
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives the search state machine:
/// `Initializing -> Evaluating -> Varying -> Evaluating -> ConvergingCheck -> ...`
pub struct OptimizationEngine {
    config: OptimizerConfig,
    schema: ParameterSchema,
    evaluator: Arc<dyn StrategyEvaluator>,
    operator: Box<dyn VariationOperator>,
    monitor: ConvergenceMonitor,
    pool: rayon::ThreadPool,
    cancellation: CancellationToken,
}

impl OptimizationEngine {
    pub fn new(config: OptimizerConfig, evaluator: Arc<dyn StrategyEvaluator>) -> Result<Self> {
        config.validate()?;
        let schema = config.resolve_schema(&evaluator.schema())?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency_limit)
            .thread_name(|i| format!("tradevolve-eval-{}", i))
            .build()
            .map_err(|e| {
                TradevolveError::Configuration(format!("Failed to build evaluation pool: {}", e))
            })?;

        let operator = config.algorithm.build();
        let monitor = ConvergenceMonitor::new(config.termination_criteria(), config.fitness_direction);

        log::info!(
            "Optimizer ready: {} over {} parameters, population {}, {} evaluation threads",
            operator.name(),
            schema.len(),
            config.population_size,
            pool.current_num_threads()
        );

        Ok(Self {
            config,
            schema,
            evaluator,
            operator,
            monitor,
            pool,
            cancellation: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Fresh run state; the seed is drawn at random when none is configured
    pub fn initialize(&self) -> RunState {
        let seed = self.config.random_seed.unwrap_or_else(rand::random);
        log::info!("Starting run with seed {}", seed);
        RunState::new(
            self.schema.clone(),
            seed,
            HallOfFame::new(self.config.hall_of_fame_size, self.config.fitness_direction),
        )
    }

    /// Advance the state machine by one transition
    pub fn step<C: ProgressCallback>(
        &self,
        state: &mut RunState,
        series: &PriceSeries,
        callback: &mut C,
    ) -> Result<()> {
        if state.is_terminated() {
            return Ok(());
        }
        if self.cancellation.is_cancelled() {
            log::info!("Run cancelled after {} iterations", state.iteration);
            state.phase = EnginePhase::Terminated(TerminationReason::Cancelled);
            return Ok(());
        }

        match state.phase {
            EnginePhase::Initializing => {
                state.population =
                    Population::initialize(self.config.population_size, &self.schema, &mut state.rng)?;
                state.phase = EnginePhase::Evaluating;
            }
            EnginePhase::Evaluating => {
                self.evaluate_pending(state, series, callback);
                self.monitor.observe(state);

                if state.awaiting_check {
                    state.phase = EnginePhase::ConvergingCheck;
                } else {
                    self.monitor.set_baseline(state);
                    state.phase = EnginePhase::Varying;
                }
            }
            EnginePhase::Varying => {
                callback.on_iteration_start(state.iteration + 1);

                let policy = self.operator.replacement_policy();
                let direction = self.config.fitness_direction;
                let offspring = {
                    let ctx = VariationContext {
                        schema: &self.schema,
                        direction,
                        iteration: state.iteration,
                        global_best: state.best.as_ref(),
                    };
                    let count = policy.offspring_needed(state.population.len());
                    self.operator
                        .vary(&state.population, &ctx, count, &mut state.rng)
                };

                state.population = state
                    .population
                    .replace(offspring, policy, direction, &self.schema);
                state.awaiting_check = true;
                state.phase = EnginePhase::Evaluating;
            }
            EnginePhase::ConvergingCheck => {
                state.awaiting_check = false;
                let reason = self.monitor.check(state);
                callback.on_iteration_complete(state.iteration, state.best_fitness(), state.stagnation);

                state.phase = match reason {
                    Some(reason) => {
                        log::info!(
                            "Terminating after {} iterations: {}",
                            state.iteration, reason
                        );
                        EnginePhase::Terminated(reason)
                    }
                    None => EnginePhase::Evaluating,
                };
            }
            EnginePhase::Terminated(_) => {}
        }

        Ok(())
    }

    /// Continue a run until it terminates. The time budget restarts here.
    pub fn resume<C: ProgressCallback>(
        &mut self,
        mut state: RunState,
        series: &PriceSeries,
        mut callback: C,
    ) -> Result<RunState> {
        self.ensure_compatible(&state)?;
        self.monitor.restart_clock();

        while !state.is_terminated() {
            self.step(&mut state, series, &mut callback)?;
        }

        Ok(state)
    }

    pub fn run<C: ProgressCallback>(&mut self, series: &PriceSeries, callback: C) -> Result<RunState> {
        let state = self.initialize();
        self.resume(state, series, callback)
    }

    /// Reject a run state produced under a different schema or population size
    pub fn ensure_compatible(&self, state: &RunState) -> Result<()> {
        if state.schema != self.schema {
            return Err(TradevolveError::Configuration(
                "Run state was created for a different parameter schema".to_string(),
            ));
        }
        if state.phase != EnginePhase::Initializing
            && state.population.len() != self.config.population_size
        {
            return Err(TradevolveError::Configuration(format!(
                "Run state holds {} individuals but population_size is {}",
                state.population.len(),
                self.config.population_size
            )));
        }
        Ok(())
    }

    /// Score every individual lacking an evaluation on the pool, then write
    /// the results back by slot on the driver thread.
    fn evaluate_pending<C: ProgressCallback>(
        &self,
        state: &mut RunState,
        series: &PriceSeries,
        callback: &mut C,
    ) {
        let pending = state.population.pending();
        if pending.is_empty() {
            return;
        }

        let evaluator = self.evaluator.as_ref();
        let results: Vec<(usize, Evaluation)> = self.pool.install(|| {
            pending
                .par_iter()
                .map(|(slot, vector)| (*slot, score(evaluator, vector, series)))
                .collect()
        });

        let direction = self.config.fitness_direction;
        let mut failed = 0;
        for (slot, evaluation) in results {
            if evaluation.is_failed() {
                failed += 1;
            }
            state.population.record(slot, evaluation, direction);
        }

        state.evaluations += pending.len();
        state.failed_evaluations += failed;
        callback.on_batch_evaluated(pending.len(), failed);
    }
}

/// Isolate one evaluation; any error or non-finite score becomes a failure
fn score(evaluator: &dyn StrategyEvaluator, vector: &ParameterVector, series: &PriceSeries) -> Evaluation {
    match evaluator.evaluate(vector, series) {
        Ok(fitness) if fitness.is_finite() => Evaluation::Scored(fitness),
        Ok(fitness) => {
            log::debug!("Non-finite fitness {} for {:?}", fitness, vector.as_slice());
            Evaluation::Failed(format!("non-finite fitness {}", fitness))
        }
        Err(e) => {
            if e.is_recoverable() {
                log::debug!("Evaluation failed for {:?}: {}", vector.as_slice(), e);
            } else {
                log::warn!("Evaluator error for {:?}: {}", vector.as_slice(), e);
            }
            Evaluation::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlgorithmConfig;
    use crate::engines::evaluation::FnEvaluator;
    use crate::engines::optimization::progress::SilentProgressCallback;
    use crate::engines::optimization::ParameterBounds;
    use chrono::{Duration, TimeZone, Utc};

    fn series() -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceSeries::from_closes("SYN", start, Duration::days(1), &[1.0, 2.0, 3.0]).unwrap()
    }

    fn evaluator() -> Arc<dyn StrategyEvaluator> {
        let schema = ParameterSchema::new(vec![ParameterBounds::real("x", 0.0, 10.0)]).unwrap();
        Arc::new(FnEvaluator::new(schema, |x, _| Ok(-(x[0] - 7.0).powi(2))))
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig {
            population_size: 8,
            max_iterations: 3,
            random_seed: Some(42),
            concurrency_limit: 2,
            algorithm: AlgorithmConfig::genetic(),
            ..Default::default()
        }
    }

    #[test]
    fn test_phase_sequence() {
        let engine = OptimizationEngine::new(config(), evaluator()).unwrap();
        let mut state = engine.initialize();
        let series = series();
        let mut callback = SilentProgressCallback;

        let mut phases = vec![state.phase()];
        for _ in 0..5 {
            engine.step(&mut state, &series, &mut callback).unwrap();
            phases.push(state.phase());
        }

        assert_eq!(
            phases,
            vec![
                EnginePhase::Initializing,
                EnginePhase::Evaluating,
                EnginePhase::Varying,
                EnginePhase::Evaluating,
                EnginePhase::ConvergingCheck,
                EnginePhase::Evaluating,
            ]
        );
        assert_eq!(state.iteration(), 1);
        assert_eq!(state.evaluations(), 8 + 6);
    }

    #[test]
    fn test_cancelled_token_stops_between_states() {
        let token = CancellationToken::new();
        let mut engine = OptimizationEngine::new(config(), evaluator())
            .unwrap()
            .with_cancellation(token.clone());
        token.cancel();

        let state = engine.run(&series(), SilentProgressCallback).unwrap();
        assert_eq!(state.termination_reason(), Some(TerminationReason::Cancelled));
        assert_eq!(state.evaluations(), 0);
    }

    #[test]
    fn test_rejects_mismatched_bounds() {
        let config = OptimizerConfig {
            bounds: vec![
                ParameterBounds::real("a", 0.0, 1.0),
                ParameterBounds::real("b", 0.0, 1.0),
            ],
            ..config()
        };
        assert!(OptimizationEngine::new(config, evaluator()).is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_time_budget() {
        let config = OptimizerConfig {
            time_budget_secs: Some(1e20),
            ..config()
        };
        assert!(matches!(
            OptimizationEngine::new(config, evaluator()),
            Err(TradevolveError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_overflowing_range() {
        let config = OptimizerConfig {
            bounds: vec![ParameterBounds::real("x", -1e308, 1e308)],
            ..config()
        };
        assert!(matches!(
            OptimizationEngine::new(config, evaluator()),
            Err(TradevolveError::Configuration(_))
        ));
    }

    #[test]
    fn test_resume_rejects_foreign_state() {
        let engine = OptimizationEngine::new(config(), evaluator()).unwrap();
        let state = engine.initialize();

        let other_schema = ParameterSchema::new(vec![ParameterBounds::real("x", 0.0, 5.0)]).unwrap();
        let mut other = OptimizationEngine::new(
            config(),
            Arc::new(FnEvaluator::new(other_schema, |x, _| Ok(x[0]))),
        )
        .unwrap();
        assert!(other.resume(state, &series(), SilentProgressCallback).is_err());
    }
}
