pub mod convergence;
pub mod engine;
pub mod fitness;
pub mod hall_of_fame;
pub mod individual;
pub mod operators;
pub mod parameters;
pub mod population;
pub mod progress;
pub mod report;
pub mod run_state;
pub mod variation;

pub use convergence::{ConvergenceMonitor, TerminationCriteria, TerminationReason};
pub use engine::{CancellationToken, OptimizationEngine};
pub use fitness::{Evaluation, FitnessDirection};
pub use hall_of_fame::{EliteEntry, HallOfFame};
pub use individual::{Individual, ScoredVector};
pub use operators::SelectionMethod;
pub use parameters::{ParameterBounds, ParameterKind, ParameterSchema, ParameterVector};
pub use population::{Population, ReplacementPolicy};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressMessage,
    SilentProgressCallback,
};
pub use report::{NamedParameter, OptimizationReport, ResultReporter};
pub use run_state::{EnginePhase, RunState};
pub use variation::{
    AnnealingVariation, GeneticVariation, SwarmVariation, VariationContext, VariationOperator,
};
