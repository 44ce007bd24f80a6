use super::fitness::{Evaluation, FitnessDirection};
use super::parameters::{ParameterSchema, ParameterVector};
use serde::{Deserialize, Serialize};

/// A parameter vector together with a successful score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVector {
    pub vector: ParameterVector,
    pub fitness: f64,
}

/// One candidate solution plus the algorithm state attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    vector: ParameterVector,
    evaluation: Option<Evaluation>,
    /// Swarm velocity
    velocity: Option<Vec<f64>>,
    /// Swarm personal best
    personal_best: Option<ScoredVector>,
    /// Accepted state of an annealing chain
    anchor: Option<ScoredVector>,
    /// Generations survived without being replaced
    age: u32,
}

impl Individual {
    pub fn new(vector: ParameterVector) -> Self {
        Self {
            vector,
            evaluation: None,
            velocity: None,
            personal_best: None,
            anchor: None,
            age: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec<f64>) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_personal_best(mut self, best: Option<ScoredVector>) -> Self {
        self.personal_best = best;
        self
    }

    pub fn with_anchor(mut self, anchor: Option<ScoredVector>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn vector(&self) -> &ParameterVector {
        &self.vector
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Successful score, if any
    pub fn score(&self) -> Option<f64> {
        self.evaluation.as_ref().and_then(Evaluation::score)
    }

    /// Raw fitness for ranking; failed or unscored individuals rank last
    pub fn fitness(&self, direction: FitnessDirection) -> f64 {
        self.score().unwrap_or_else(|| direction.worst())
    }

    pub fn velocity(&self) -> Option<&[f64]> {
        self.velocity.as_deref()
    }

    pub fn personal_best(&self) -> Option<&ScoredVector> {
        self.personal_best.as_ref()
    }

    pub fn anchor(&self) -> Option<&ScoredVector> {
        self.anchor.as_ref()
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Score as a `ScoredVector`, if evaluation succeeded
    pub fn scored(&self) -> Option<ScoredVector> {
        self.score().map(|fitness| ScoredVector {
            vector: self.vector.clone(),
            fitness,
        })
    }

    /// Store an evaluation and refresh the personal best
    pub(crate) fn record(&mut self, evaluation: Evaluation, direction: FitnessDirection) {
        if let Evaluation::Scored(fitness) = evaluation {
            let improves = self
                .personal_best
                .as_ref()
                .map_or(true, |best| direction.is_better(fitness, best.fitness));
            if improves {
                self.personal_best = Some(ScoredVector {
                    vector: self.vector.clone(),
                    fitness,
                });
            }
        }
        self.evaluation = Some(evaluation);
    }

    /// Force the vector back into bounds; a changed vector loses its evaluation
    pub(crate) fn clamped(self, schema: &ParameterSchema) -> Self {
        if schema.contains(&self.vector) {
            return self;
        }
        let vector = schema.clamp_to_bounds(self.vector.as_slice());
        Self {
            vector,
            evaluation: None,
            ..self
        }
    }

    /// Same individual carried into the next generation
    pub(crate) fn survived(&self) -> Self {
        let mut next = self.clone();
        next.age = next.age.saturating_add(1);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_personal_best() {
        let direction = FitnessDirection::Minimize;
        let mut individual = Individual::new(ParameterVector::new(vec![1.0]));
        assert!(!individual.is_evaluated());

        individual.record(Evaluation::Scored(4.0), direction);
        individual.record(Evaluation::Scored(6.0), direction);
        assert_eq!(individual.personal_best().unwrap().fitness, 4.0);

        individual.record(Evaluation::Failed("bad".into()), direction);
        assert_eq!(individual.personal_best().unwrap().fitness, 4.0);
        assert_eq!(individual.fitness(direction), f64::INFINITY);
    }

    #[test]
    fn test_survived_increments_age() {
        let individual = Individual::new(ParameterVector::new(vec![1.0]));
        assert_eq!(individual.survived().survived().age(), 2);
    }
}
