//! Algorithm-specific operators applied in the `Varying` state.
//!
//! Each operator proposes offspring from the current population; the engine
//! then hands them to [`Population::replace`] with the operator's policy.

use super::fitness::FitnessDirection;
use super::individual::{Individual, ScoredVector};
use super::operators::{blend_crossover, mutate, perturb_one, select, SelectionMethod};
use super::parameters::ParameterSchema;
use super::population::{Population, ReplacementPolicy};
use rand::Rng;
use rand_pcg::Pcg64;

/// Read-only view of the run handed to operators
pub struct VariationContext<'a> {
    pub schema: &'a ParameterSchema,
    pub direction: FitnessDirection,
    /// Completed iterations so far
    pub iteration: usize,
    /// Best vector seen in the run
    pub global_best: Option<&'a ScoredVector>,
}

pub trait VariationOperator: Send + Sync {
    fn name(&self) -> &'static str;

    fn replacement_policy(&self) -> ReplacementPolicy;

    /// Propose `count` new individuals, all within bounds
    fn vary(
        &self,
        population: &Population,
        ctx: &VariationContext<'_>,
        count: usize,
        rng: &mut Pcg64,
    ) -> Vec<Individual>;
}

/// Selection, blend crossover and Gaussian mutation
#[derive(Debug, Clone)]
pub struct GeneticVariation {
    pub selection: SelectionMethod,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub blend_alpha: f64,
    pub mutation_rate: f64,
    pub mutation_magnitude: f64,
    pub replacement: ReplacementPolicy,
}

impl VariationOperator for GeneticVariation {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn replacement_policy(&self) -> ReplacementPolicy {
        self.replacement
    }

    fn vary(
        &self,
        population: &Population,
        ctx: &VariationContext<'_>,
        count: usize,
        rng: &mut Pcg64,
    ) -> Vec<Individual> {
        let individuals = population.individuals();
        let mut offspring = Vec::with_capacity(count);
        let pick = |rng: &mut Pcg64| {
            select(
                self.selection,
                individuals,
                ctx.direction,
                self.tournament_size,
                rng,
            )
        };

        while offspring.len() < count {
            if rng.gen::<f64>() < self.crossover_rate {
                let parent1 = individuals[pick(rng)].vector();
                let parent2 = individuals[pick(rng)].vector();
                let (child1, child2) =
                    blend_crossover(parent1, parent2, self.blend_alpha, ctx.schema, rng);

                let child1 = mutate(&child1, self.mutation_rate, self.mutation_magnitude, ctx.schema, rng);
                offspring.push(Individual::new(child1));
                if offspring.len() < count {
                    let child2 =
                        mutate(&child2, self.mutation_rate, self.mutation_magnitude, ctx.schema, rng);
                    offspring.push(Individual::new(child2));
                }
            } else {
                // Reproduction (copy) with mutation
                let parent = individuals[pick(rng)].vector();
                let child = mutate(parent, self.mutation_rate, self.mutation_magnitude, ctx.schema, rng);
                offspring.push(Individual::new(child));
            }
        }

        offspring
    }
}

/// Particle swarm velocity and position update
#[derive(Debug, Clone)]
pub struct SwarmVariation {
    pub inertia_weight: f64,
    pub cognitive_coefficient: f64,
    pub social_coefficient: f64,
    /// Velocity cap as a fraction of each parameter's range
    pub max_velocity_fraction: f64,
}

impl VariationOperator for SwarmVariation {
    fn name(&self) -> &'static str {
        "swarm"
    }

    fn replacement_policy(&self) -> ReplacementPolicy {
        ReplacementPolicy::Generational
    }

    fn vary(
        &self,
        population: &Population,
        ctx: &VariationContext<'_>,
        count: usize,
        rng: &mut Pcg64,
    ) -> Vec<Individual> {
        population
            .iter()
            .take(count)
            .map(|particle| {
                let position = particle.vector();
                let personal = particle.personal_best().map(|b| &b.vector).unwrap_or(position);
                let global = ctx.global_best.map(|b| &b.vector).unwrap_or(personal);

                let mut velocity = Vec::with_capacity(position.len());
                let mut next = Vec::with_capacity(position.len());
                for (i, bounds) in ctx.schema.parameters().iter().enumerate() {
                    let x = position[i];
                    let v = particle.velocity().and_then(|v| v.get(i)).copied().unwrap_or(0.0);
                    let r1: f64 = rng.gen();
                    let r2: f64 = rng.gen();
                    let cap = self.max_velocity_fraction * bounds.range();

                    let v = self.inertia_weight * v
                        + self.cognitive_coefficient * r1 * (personal[i] - x)
                        + self.social_coefficient * r2 * (global[i] - x);
                    let v = v.clamp(-cap, cap);
                    // Stop at the wall instead of pushing further out; only
                    // the position snaps to the integer grid
                    let target = (x + v).clamp(bounds.min, bounds.max);
                    velocity.push(target - x);
                    next.push(bounds.clamp(target));
                }

                Individual::new(ctx.schema.clamp_to_bounds(&next))
                    .with_velocity(velocity)
                    .with_personal_best(particle.personal_best().cloned())
            })
            .collect()
    }
}

/// Independent simulated-annealing chains, one per slot
#[derive(Debug, Clone)]
pub struct AnnealingVariation {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    /// Gaussian step as a fraction of the perturbed parameter's range
    pub perturbation_scale: f64,
}

impl AnnealingVariation {
    /// Geometric cooling schedule
    pub fn temperature(&self, iteration: usize) -> f64 {
        let exponent = i32::try_from(iteration).unwrap_or(i32::MAX);
        self.initial_temperature * self.cooling_rate.powi(exponent)
    }

    /// Metropolis rule: keep improvements, accept a worse candidate with
    /// probability exp(delta / T)
    fn accept(&self, delta: f64, temperature: f64, rng: &mut Pcg64) -> bool {
        if delta > 0.0 {
            return true;
        }
        if temperature <= f64::MIN_POSITIVE {
            return false;
        }
        rng.gen::<f64>() < (delta / temperature).exp()
    }
}

impl VariationOperator for AnnealingVariation {
    fn name(&self) -> &'static str {
        "annealing"
    }

    fn replacement_policy(&self) -> ReplacementPolicy {
        ReplacementPolicy::Generational
    }

    fn vary(
        &self,
        population: &Population,
        ctx: &VariationContext<'_>,
        count: usize,
        rng: &mut Pcg64,
    ) -> Vec<Individual> {
        let temperature = self.temperature(ctx.iteration);

        population
            .iter()
            .take(count)
            .map(|chain| {
                let candidate = chain.scored();
                let current = match (chain.anchor(), candidate) {
                    (None, candidate) => candidate,
                    (Some(anchor), None) => Some(anchor.clone()),
                    (Some(anchor), Some(candidate)) => {
                        let delta = ctx.direction.improvement(candidate.fitness, anchor.fitness);
                        if self.accept(delta, temperature, rng) {
                            Some(candidate)
                        } else {
                            Some(anchor.clone())
                        }
                    }
                };

                let origin = current.as_ref().map(|c| &c.vector).unwrap_or(chain.vector());
                let next = perturb_one(origin, self.perturbation_scale, ctx.schema, rng);
                Individual::new(next).with_anchor(current)
            })
            .collect()
    }
}
