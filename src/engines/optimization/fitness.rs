use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Whether higher or lower fitness is better. Fixed by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessDirection {
    #[default]
    Maximize,
    Minimize,
}

impl FitnessDirection {
    /// Map a raw score into "higher is better" space
    pub fn oriented(&self, fitness: f64) -> f64 {
        match self {
            Self::Maximize => fitness,
            Self::Minimize => -fitness,
        }
    }

    /// Worst admissible raw score
    pub fn worst(&self) -> f64 {
        match self {
            Self::Maximize => f64::NEG_INFINITY,
            Self::Minimize => f64::INFINITY,
        }
    }

    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        self.oriented(candidate) > self.oriented(incumbent)
    }

    /// Improvement of `candidate` over `incumbent`, positive when better
    pub fn improvement(&self, candidate: f64, incumbent: f64) -> f64 {
        self.oriented(candidate) - self.oriented(incumbent)
    }

    /// `Ordering::Less` when `a` ranks ahead of `b`
    pub fn rank_order(&self, a: f64, b: f64) -> Ordering {
        self.oriented(b)
            .partial_cmp(&self.oriented(a))
            .unwrap_or(Ordering::Equal)
    }

    /// True once `fitness` has crossed `target`
    pub fn reached(&self, fitness: f64, target: f64) -> bool {
        self.oriented(fitness) >= self.oriented(target)
    }
}

/// Outcome of scoring one individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evaluation {
    Scored(f64),
    Failed(String),
}

impl Evaluation {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored(f) => Some(*f),
            Self::Failed(_) => None,
        }
    }

    /// Raw fitness, with failures mapped to the worst admissible score
    pub fn fitness(&self, direction: FitnessDirection) -> f64 {
        self.score().unwrap_or_else(|| direction.worst())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
