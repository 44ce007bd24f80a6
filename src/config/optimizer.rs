use super::traits::{ensure_non_negative, ensure_unit_interval, ConfigSection};
use crate::engines::optimization::{
    AnnealingVariation, FitnessDirection, GeneticVariation, ParameterBounds, ParameterSchema,
    ReplacementPolicy, SelectionMethod, SwarmVariation, TerminationCriteria, VariationOperator,
};
use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub max_iterations: usize,
    /// Iterations without improvement before stopping
    pub max_stagnation: Option<usize>,
    pub stagnation_epsilon: f64,
    pub target_fitness: Option<f64>,
    pub time_budget_secs: Option<f64>,
    /// Overrides the evaluator's own schema when non-empty
    pub bounds: Vec<ParameterBounds>,
    pub random_seed: Option<u64>,
    pub fitness_direction: FitnessDirection,
    /// Evaluation threads; 0 uses every core
    pub concurrency_limit: usize,
    pub hall_of_fame_size: usize,
    pub algorithm: AlgorithmConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            max_iterations: 100,
            max_stagnation: None,
            stagnation_epsilon: 0.0,
            target_fitness: None,
            time_budget_secs: None,
            bounds: Vec::new(),
            random_seed: None,
            fitness_direction: FitnessDirection::Maximize,
            concurrency_limit: 0,
            hall_of_fame_size: 10,
            algorithm: AlgorithmConfig::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn termination_criteria(&self) -> TerminationCriteria {
        TerminationCriteria {
            max_iterations: self.max_iterations,
            max_stagnation: self.max_stagnation,
            stagnation_epsilon: self.stagnation_epsilon,
            target_fitness: self.target_fitness,
            time_budget: self
                .time_budget_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }

    /// The search space: configured bounds if any, else the evaluator's schema
    pub fn resolve_schema(&self, evaluator_schema: &ParameterSchema) -> Result<ParameterSchema> {
        if self.bounds.is_empty() {
            return Ok(evaluator_schema.clone());
        }
        if self.bounds.len() != evaluator_schema.len() {
            return Err(TradevolveError::Configuration(format!(
                "Configured bounds have {} parameters but the evaluator expects {}",
                self.bounds.len(),
                evaluator_schema.len()
            )));
        }
        ParameterSchema::new(self.bounds.clone())
    }
}

impl ConfigSection for OptimizerConfig {
    fn section_name() -> &'static str {
        "optimizer"
    }

    fn validate(&self) -> Result<()> {
        let section = Self::section_name();

        if self.population_size == 0 {
            return Err(TradevolveError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(TradevolveError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_stagnation == Some(0) {
            return Err(TradevolveError::Configuration(
                "max_stagnation must be at least 1 when set".to_string(),
            ));
        }
        ensure_non_negative(section, "stagnation_epsilon", self.stagnation_epsilon)?;

        if let Some(target) = self.target_fitness {
            if !target.is_finite() {
                return Err(TradevolveError::Configuration(
                    "target_fitness must be finite".to_string(),
                ));
            }
        }
        if let Some(budget) = self.time_budget_secs {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(TradevolveError::Configuration(format!(
                    "time_budget_secs must be positive, got {}",
                    budget
                )));
            }
            Duration::try_from_secs_f64(budget).map_err(|e| {
                TradevolveError::Configuration(format!(
                    "time_budget_secs {} is not a representable duration: {}",
                    budget, e
                ))
            })?;
        }

        for bounds in &self.bounds {
            bounds.validate()?;
        }

        self.algorithm.validate(self.population_size)
    }
}

/// Search algorithm and its hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlgorithmConfig {
    Genetic {
        #[serde(default)]
        selection: SelectionMethod,
        #[serde(default = "default_tournament_size")]
        tournament_size: usize,
        #[serde(default = "default_crossover_rate")]
        crossover_rate: f64,
        #[serde(default = "default_blend_alpha")]
        blend_alpha: f64,
        #[serde(default = "default_mutation_rate")]
        mutation_rate: f64,
        #[serde(default = "default_mutation_magnitude")]
        mutation_magnitude: f64,
        #[serde(default)]
        replacement: ReplacementPolicy,
    },
    Swarm {
        #[serde(default = "default_inertia_weight")]
        inertia_weight: f64,
        #[serde(default = "default_acceleration")]
        cognitive_coefficient: f64,
        #[serde(default = "default_acceleration")]
        social_coefficient: f64,
        #[serde(default = "default_max_velocity_fraction")]
        max_velocity_fraction: f64,
    },
    Annealing {
        #[serde(default = "default_initial_temperature")]
        initial_temperature: f64,
        #[serde(default = "default_cooling_rate")]
        cooling_rate: f64,
        #[serde(default = "default_perturbation_scale")]
        perturbation_scale: f64,
    },
}

fn default_tournament_size() -> usize {
    3
}
fn default_crossover_rate() -> f64 {
    0.9
}
fn default_blend_alpha() -> f64 {
    0.5
}
fn default_mutation_rate() -> f64 {
    0.2
}
fn default_mutation_magnitude() -> f64 {
    0.1
}
fn default_inertia_weight() -> f64 {
    0.7
}
fn default_acceleration() -> f64 {
    1.5
}
fn default_max_velocity_fraction() -> f64 {
    0.2
}
fn default_initial_temperature() -> f64 {
    1.0
}
fn default_cooling_rate() -> f64 {
    0.95
}
fn default_perturbation_scale() -> f64 {
    0.1
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self::genetic()
    }
}

impl AlgorithmConfig {
    pub fn genetic() -> Self {
        Self::Genetic {
            selection: SelectionMethod::default(),
            tournament_size: default_tournament_size(),
            crossover_rate: default_crossover_rate(),
            blend_alpha: default_blend_alpha(),
            mutation_rate: default_mutation_rate(),
            mutation_magnitude: default_mutation_magnitude(),
            replacement: ReplacementPolicy::default(),
        }
    }

    pub fn swarm() -> Self {
        Self::Swarm {
            inertia_weight: default_inertia_weight(),
            cognitive_coefficient: default_acceleration(),
            social_coefficient: default_acceleration(),
            max_velocity_fraction: default_max_velocity_fraction(),
        }
    }

    pub fn annealing() -> Self {
        Self::Annealing {
            initial_temperature: default_initial_temperature(),
            cooling_rate: default_cooling_rate(),
            perturbation_scale: default_perturbation_scale(),
        }
    }

    pub fn validate(&self, population_size: usize) -> Result<()> {
        let section = "optimizer.algorithm";
        match *self {
            Self::Genetic {
                tournament_size,
                crossover_rate,
                blend_alpha,
                mutation_rate,
                mutation_magnitude,
                replacement,
                ..
            } => {
                if tournament_size == 0 {
                    return Err(TradevolveError::Configuration(
                        "Tournament size must be at least 1".to_string(),
                    ));
                }
                ensure_unit_interval(section, "crossover_rate", crossover_rate)?;
                ensure_unit_interval(section, "mutation_rate", mutation_rate)?;
                ensure_non_negative(section, "blend_alpha", blend_alpha)?;
                ensure_non_negative(section, "mutation_magnitude", mutation_magnitude)?;
                replacement.validate(population_size)
            }
            Self::Swarm {
                inertia_weight,
                cognitive_coefficient,
                social_coefficient,
                max_velocity_fraction,
            } => {
                ensure_non_negative(section, "inertia_weight", inertia_weight)?;
                ensure_non_negative(section, "cognitive_coefficient", cognitive_coefficient)?;
                ensure_non_negative(section, "social_coefficient", social_coefficient)?;
                if !(max_velocity_fraction > 0.0 && max_velocity_fraction <= 1.0) {
                    return Err(TradevolveError::Configuration(format!(
                        "max_velocity_fraction must be in (0, 1], got {}",
                        max_velocity_fraction
                    )));
                }
                Ok(())
            }
            Self::Annealing {
                initial_temperature,
                cooling_rate,
                perturbation_scale,
            } => {
                ensure_non_negative(section, "initial_temperature", initial_temperature)?;
                if !(cooling_rate > 0.0 && cooling_rate <= 1.0) {
                    return Err(TradevolveError::Configuration(format!(
                        "cooling_rate must be in (0, 1], got {}",
                        cooling_rate
                    )));
                }
                if !perturbation_scale.is_finite() || perturbation_scale <= 0.0 {
                    return Err(TradevolveError::Configuration(format!(
                        "perturbation_scale must be positive, got {}",
                        perturbation_scale
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn build(&self) -> Box<dyn VariationOperator> {
        match *self {
            Self::Genetic {
                selection,
                tournament_size,
                crossover_rate,
                blend_alpha,
                mutation_rate,
                mutation_magnitude,
                replacement,
            } => Box::new(GeneticVariation {
                selection,
                tournament_size,
                crossover_rate,
                blend_alpha,
                mutation_rate,
                mutation_magnitude,
                replacement,
            }),
            Self::Swarm {
                inertia_weight,
                cognitive_coefficient,
                social_coefficient,
                max_velocity_fraction,
            } => Box::new(SwarmVariation {
                inertia_weight,
                cognitive_coefficient,
                social_coefficient,
                max_velocity_fraction,
            }),
            Self::Annealing {
                initial_temperature,
                cooling_rate,
                perturbation_scale,
            } => Box::new(AnnealingVariation {
                initial_temperature,
                cooling_rate,
                perturbation_scale,
            }),
        }
    }
}
