use super::fitness::FitnessDirection;
use super::run_state::RunState;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    TargetReached,
    MaxStagnation,
    TimeBudgetExceeded,
    MaxIterations,
    Cancelled,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::TargetReached => "target fitness reached",
            Self::MaxStagnation => "no improvement within the stagnation limit",
            Self::TimeBudgetExceeded => "time budget exceeded",
            Self::MaxIterations => "maximum iterations reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct TerminationCriteria {
    pub max_iterations: usize,
    pub max_stagnation: Option<usize>,
    /// Minimum improvement that resets the stagnation counter
    pub stagnation_epsilon: f64,
    pub target_fitness: Option<f64>,
    pub time_budget: Option<Duration>,
}

/// Tracks the best-so-far and decides when a run stops
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    criteria: TerminationCriteria,
    direction: FitnessDirection,
    started: Instant,
}

impl ConvergenceMonitor {
    pub fn new(criteria: TerminationCriteria, direction: FitnessDirection) -> Self {
        Self {
            criteria,
            direction,
            started: Instant::now(),
        }
    }

    pub fn criteria(&self) -> &TerminationCriteria {
        &self.criteria
    }

    /// Start the time budget over
    pub fn restart_clock(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fold a freshly evaluated batch into the best-so-far and the hall of fame.
    ///
    /// Only strictly better scores replace the incumbent, so on ties the
    /// earlier discovery stands.
    pub fn observe(&self, state: &mut RunState) {
        let direction = self.direction;

        if let Some((_, candidate)) = state.population.best(direction) {
            if let Some(scored) = candidate.scored() {
                let improves = state
                    .best
                    .as_ref()
                    .map_or(true, |best| direction.is_better(scored.fitness, best.fitness));
                if improves {
                    log::debug!(
                        "New best fitness {:.6} at {:?}",
                        scored.fitness,
                        scored.vector.as_slice()
                    );
                    state.best = Some(scored);
                }
            }
        }

        let iteration = state.iteration;
        for individual in state.population.iter() {
            if let Some(score) = individual.score() {
                state.hall_of_fame.try_add(individual.vector(), score, iteration);
            }
        }
    }

    /// Use the current best as the reference for the next stagnation check
    pub fn set_baseline(&self, state: &mut RunState) {
        state.last_checked_best = state.best_fitness();
    }

    /// Close one iteration: advance the counter, update stagnation and
    /// history, then test the stopping rules in priority order.
    pub fn check(&self, state: &mut RunState) -> Option<TerminationReason> {
        state.iteration += 1;

        let best = state.best_fitness();
        let improved = match (best, state.last_checked_best) {
            (Some(current), Some(previous)) => {
                self.direction.improvement(current, previous) > self.criteria.stagnation_epsilon
            }
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            state.stagnation = 0;
        } else {
            state.stagnation += 1;
        }
        state.last_checked_best = best;
        if let Some(best) = best {
            state.history.push(best);
        }

        self.termination_reason(state)
    }

    fn termination_reason(&self, state: &RunState) -> Option<TerminationReason> {
        if let (Some(target), Some(best)) = (self.criteria.target_fitness, state.best_fitness()) {
            if self.direction.reached(best, target) {
                return Some(TerminationReason::TargetReached);
            }
        }

        if let Some(limit) = self.criteria.max_stagnation {
            if state.stagnation >= limit {
                return Some(TerminationReason::MaxStagnation);
            }
        }

        if let Some(budget) = self.criteria.time_budget {
            if self.started.elapsed() >= budget {
                return Some(TerminationReason::TimeBudgetExceeded);
            }
        }

        if state.iteration >= self.criteria.max_iterations {
            return Some(TerminationReason::MaxIterations);
        }

        None
    }
}
