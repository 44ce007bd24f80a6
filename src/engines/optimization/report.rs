use super::convergence::TerminationReason;
use super::hall_of_fame::EliteEntry;
use super::parameters::ParameterVector;
use super::run_state::RunState;
use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParameter {
    pub name: String,
    pub value: f64,
}

/// Summary of a run, suitable for printing or writing as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub best_parameters: ParameterVector,
    pub named_parameters: Vec<NamedParameter>,
    pub best_fitness: f64,
    pub iterations_run: usize,
    pub evaluations: usize,
    pub failed_evaluations: usize,
    /// `None` when reported from a run that has not terminated
    pub termination_reason: Option<TerminationReason>,
    pub seed: u64,
    pub history: Vec<f64>,
    pub elites: Vec<EliteEntry>,
}

impl OptimizationReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ResultReporter;

impl ResultReporter {
    pub fn report(state: &RunState) -> Result<OptimizationReport> {
        let best = state.best().ok_or(TradevolveError::NoResult)?;

        let named_parameters = state
            .schema()
            .label(&best.vector)
            .into_iter()
            .map(|(name, value)| NamedParameter { name, value })
            .collect();

        Ok(OptimizationReport {
            best_parameters: best.vector.clone(),
            named_parameters,
            best_fitness: best.fitness,
            iterations_run: state.iteration(),
            evaluations: state.evaluations(),
            failed_evaluations: state.failed_evaluations(),
            termination_reason: state.termination_reason(),
            seed: state.seed(),
            history: state.history().to_vec(),
            elites: state.hall_of_fame().get_all().to_vec(),
        })
    }
}
