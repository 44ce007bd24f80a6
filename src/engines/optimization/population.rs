use super::fitness::{Evaluation, FitnessDirection};
use super::individual::Individual;
use super::parameters::{ParameterSchema, ParameterVector};
use crate::error::{Result, TradevolveError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How offspring enter the next population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Offspring replace every slot
    Generational,
    /// The best `count` survive unconditionally, offspring fill the rest
    Elitist { count: usize },
    /// Offspring replace the worst `count` slots
    SteadyState { count: usize },
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        Self::Elitist { count: 2 }
    }
}

impl ReplacementPolicy {
    /// Number of children an operator should produce
    pub fn offspring_needed(&self, size: usize) -> usize {
        match *self {
            Self::Generational => size,
            Self::Elitist { count } => size.saturating_sub(count),
            Self::SteadyState { count } => count.min(size),
        }
    }

    pub fn validate(&self, size: usize) -> Result<()> {
        match *self {
            Self::Generational => Ok(()),
            Self::Elitist { count } if count >= size => Err(TradevolveError::Configuration(
                format!(
                    "Elite count ({}) must be smaller than the population size ({})",
                    count, size
                ),
            )),
            Self::SteadyState { count } if count == 0 || count > size => {
                Err(TradevolveError::Configuration(format!(
                    "Steady-state replacement count must be within 1..={}, got {}",
                    size, count
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Fixed-size, slot-indexed set of individuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// `size` individuals drawn uniformly within the schema bounds
    pub fn initialize<R: Rng>(size: usize, schema: &ParameterSchema, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(TradevolveError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        let individuals = (0..size)
            .map(|_| Individual::new(schema.sample(rng)))
            .collect();
        Ok(Self { individuals })
    }

    pub(crate) fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn get(&self, slot: usize) -> Option<&Individual> {
        self.individuals.get(slot)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    /// Slots still waiting for a score
    pub fn pending(&self) -> Vec<(usize, ParameterVector)> {
        self.individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_evaluated())
            .map(|(slot, ind)| (slot, ind.vector().clone()))
            .collect()
    }

    pub(crate) fn record(&mut self, slot: usize, evaluation: Evaluation, direction: FitnessDirection) {
        if let Some(individual) = self.individuals.get_mut(slot) {
            individual.record(evaluation, direction);
        }
    }

    /// Slot indices best first; ties keep slot order
    pub fn ranked(&self, direction: FitnessDirection) -> Vec<usize> {
        let mut slots: Vec<usize> = (0..self.individuals.len()).collect();
        slots.sort_by(|&a, &b| {
            direction.rank_order(
                self.individuals[a].fitness(direction),
                self.individuals[b].fitness(direction),
            )
        });
        slots
    }

    /// Best successfully scored individual; the earliest slot wins ties
    pub fn best(&self, direction: FitnessDirection) -> Option<(usize, &Individual)> {
        let mut best: Option<(usize, &Individual, f64)> = None;
        for (slot, individual) in self.individuals.iter().enumerate() {
            let Some(score) = individual.score() else {
                continue;
            };
            match best {
                Some((_, _, incumbent)) if !direction.is_better(score, incumbent) => {}
                _ => best = Some((slot, individual, score)),
            }
        }
        best.map(|(slot, individual, _)| (slot, individual))
    }

    /// Apply a replacement policy, returning a population of the same size.
    ///
    /// Offspring are clamped into the schema bounds on the way in. When too
    /// few offspring are supplied the gap is filled with the best survivors.
    pub fn replace(
        &self,
        offspring: Vec<Individual>,
        policy: ReplacementPolicy,
        direction: FitnessDirection,
        schema: &ParameterSchema,
    ) -> Population {
        let size = self.individuals.len();
        let ranked = self.ranked(direction);
        let mut offspring = offspring.into_iter().map(|ind| ind.clamped(schema));

        let individuals = match policy {
            ReplacementPolicy::Generational => {
                let mut next: Vec<Individual> = offspring.by_ref().take(size).collect();
                self.fill_with_survivors(&mut next, &ranked, 0);
                next
            }
            ReplacementPolicy::Elitist { count } => {
                let elites = count.min(size);
                let mut next: Vec<Individual> = ranked[..elites]
                    .iter()
                    .map(|&slot| self.individuals[slot].survived())
                    .collect();
                next.extend(offspring.by_ref().take(size - elites));
                self.fill_with_survivors(&mut next, &ranked, elites);
                next
            }
            ReplacementPolicy::SteadyState { count } => {
                let mut next: Vec<Individual> =
                    self.individuals.iter().map(Individual::survived).collect();
                for &slot in ranked.iter().rev().take(count.min(size)) {
                    match offspring.next() {
                        Some(child) => next[slot] = child,
                        None => break,
                    }
                }
                next
            }
        };

        debug_assert_eq!(individuals.len(), size);
        Population { individuals }
    }

    fn fill_with_survivors(&self, next: &mut Vec<Individual>, ranked: &[usize], skip: usize) {
        let size = self.individuals.len();
        let mut survivors = ranked.iter().skip(skip).cycle();
        while next.len() < size {
            match survivors.next() {
                Some(&slot) => next.push(self.individuals[slot].survived()),
                None => break,
            }
        }
        next.truncate(size);
    }
}
