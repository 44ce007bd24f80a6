use super::convergence::TerminationReason;
use super::hall_of_fame::HallOfFame;
use super::individual::ScoredVector;
use super::parameters::ParameterSchema;
use super::population::Population;
use crate::error::Result;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Where the engine's state machine currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Initializing,
    Evaluating,
    Varying,
    ConvergingCheck,
    Terminated(TerminationReason),
}

/// Everything needed to continue a run exactly where it stopped.
///
/// The pseudo-random generator is part of the state, so a deserialized run
/// replays the same trajectory as an uninterrupted one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub(crate) phase: EnginePhase,
    pub(crate) iteration: usize,
    pub(crate) schema: ParameterSchema,
    pub(crate) population: Population,
    pub(crate) best: Option<ScoredVector>,
    pub(crate) stagnation: usize,
    /// Best fitness at the previous convergence check
    pub(crate) last_checked_best: Option<f64>,
    /// Set once offspring were produced and not yet checked
    pub(crate) awaiting_check: bool,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg64,
    pub(crate) history: Vec<f64>,
    pub(crate) evaluations: usize,
    pub(crate) failed_evaluations: usize,
    pub(crate) hall_of_fame: HallOfFame,
}

impl RunState {
    pub(crate) fn new(schema: ParameterSchema, seed: u64, hall_of_fame: HallOfFame) -> Self {
        Self {
            phase: EnginePhase::Initializing,
            iteration: 0,
            schema,
            population: Population::from_individuals(Vec::new()),
            best: None,
            stagnation: 0,
            last_checked_best: None,
            awaiting_check: false,
            seed,
            rng: Pcg64::seed_from_u64(seed),
            history: Vec::new(),
            evaluations: 0,
            failed_evaluations: 0,
            hall_of_fame,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best successfully scored vector seen so far
    pub fn best(&self) -> Option<&ScoredVector> {
        self.best.as_ref()
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.fitness)
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Best fitness after each completed iteration
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn failed_evaluations(&self) -> usize {
        self.failed_evaluations
    }

    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, EnginePhase::Terminated(_))
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self.phase {
            EnginePhase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
