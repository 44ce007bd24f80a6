use super::fitness::FitnessDirection;
use super::parameters::ParameterVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EliteEntry {
    pub vector: ParameterVector,
    pub fitness: f64,
    /// Iteration in which the vector was first scored
    pub iteration: usize,
    pub signature: String, // For deduplication
}

/// Best distinct parameter vectors seen during a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HallOfFame {
    entries: Vec<EliteEntry>,
    max_size: usize,
    direction: FitnessDirection,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize, direction: FitnessDirection) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            direction,
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add a scored vector; duplicates are rejected
    pub fn try_add(&mut self, vector: &ParameterVector, fitness: f64, iteration: usize) -> bool {
        if self.max_size == 0 {
            return false;
        }

        let signature = vector.signature();
        if self.seen_signatures.contains(&signature) {
            return false;
        }

        if self.entries.len() >= self.max_size {
            let worst = &self.entries[self.entries.len() - 1];
            if !self.direction.is_better(fitness, worst.fitness) {
                return false;
            }
        }

        self.seen_signatures.insert(signature.clone());
        self.entries.push(EliteEntry {
            vector: vector.clone(),
            fitness,
            iteration,
            signature,
        });

        // Stable: earlier entries win ties
        let direction = self.direction;
        self.entries
            .sort_by(|a, b| direction.rank_order(a.fitness, b.fitness));

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_signatures.remove(&removed.signature);
            }
        }

        true
    }

    pub fn get_all(&self) -> &[EliteEntry] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[EliteEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
