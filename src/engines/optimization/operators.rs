use super::fitness::FitnessDirection;
use super::individual::Individual;
use super::parameters::{ParameterSchema, ParameterVector};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    #[default]
    Tournament,
    Roulette,
    Rank,
}

/// Pick one parent slot with the configured method
pub fn select<R: Rng>(
    method: SelectionMethod,
    population: &[Individual],
    direction: FitnessDirection,
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    match method {
        SelectionMethod::Tournament => {
            tournament_selection(population, direction, tournament_size, rng)
        }
        SelectionMethod::Roulette => roulette_selection(population, direction, rng),
        SelectionMethod::Rank => rank_selection(population, direction, rng),
    }
}

/// Tournament selection: best of K random candidates
pub fn tournament_selection<R: Rng>(
    population: &[Individual],
    direction: FitnessDirection,
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..population.len());
    let mut best_fitness = population[best_idx].fitness(direction);

    for _ in 1..tournament_size.max(1) {
        let idx = rng.gen_range(0..population.len());
        let fitness = population[idx].fitness(direction);
        if direction.is_better(fitness, best_fitness) {
            best_idx = idx;
            best_fitness = fitness;
        }
    }

    best_idx
}

/// Roulette wheel selection: probability proportional to fitness shifted
/// above the worst successful score. Failed individuals get no share.
pub fn roulette_selection<R: Rng>(
    population: &[Individual],
    direction: FitnessDirection,
    rng: &mut R,
) -> usize {
    let oriented: Vec<Option<f64>> = population
        .iter()
        .map(|ind| ind.score().map(|f| direction.oriented(f)))
        .collect();
    let floor = oriented
        .iter()
        .flatten()
        .copied()
        .fold(f64::INFINITY, f64::min);

    let weights: Vec<f64> = oriented
        .iter()
        .map(|o| o.map_or(0.0, |v| v - floor + f64::EPSILON))
        .collect();
    let total: f64 = weights.iter().sum();

    if !total.is_finite() || total <= 0.0 {
        return rng.gen_range(0..population.len());
    }

    let mut spin = rng.gen::<f64>() * total;
    for (idx, weight) in weights.iter().enumerate() {
        spin -= weight;
        if spin <= 0.0 && *weight > 0.0 {
            return idx;
        }
    }

    // Fallback
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(population.len() - 1)
}

/// Linear rank selection: the best of N gets weight N, the worst weight 1
pub fn rank_selection<R: Rng>(
    population: &[Individual],
    direction: FitnessDirection,
    rng: &mut R,
) -> usize {
    let n = population.len();
    let mut ranked: Vec<usize> = (0..n).collect();
    ranked.sort_by(|&a, &b| {
        direction.rank_order(population[a].fitness(direction), population[b].fitness(direction))
    });

    let total = n * (n + 1) / 2;
    let mut spin = rng.gen_range(0..total);
    for (position, &slot) in ranked.iter().enumerate() {
        let weight = n - position;
        if spin < weight {
            return slot;
        }
        spin -= weight;
    }

    ranked[0]
}

/// Blend crossover (BLX-alpha): each child component is drawn uniformly from
/// the parents' interval widened by `alpha` on both sides, then clamped.
pub fn blend_crossover<R: Rng>(
    parent1: &ParameterVector,
    parent2: &ParameterVector,
    alpha: f64,
    schema: &ParameterSchema,
    rng: &mut R,
) -> (ParameterVector, ParameterVector) {
    let mut child1 = Vec::with_capacity(parent1.len());
    let mut child2 = Vec::with_capacity(parent1.len());

    for (&a, &b) in parent1.iter().zip(parent2.iter()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let spread = (hi - lo) * alpha;
        let (lo, hi) = (lo - spread, hi + spread);
        if hi > lo {
            child1.push(rng.gen_range(lo..=hi));
            child2.push(rng.gen_range(lo..=hi));
        } else {
            child1.push(a);
            child2.push(b);
        }
    }

    (
        schema.clamp_to_bounds(&child1),
        schema.clamp_to_bounds(&child2),
    )
}

/// Gaussian mutation: each component is perturbed with probability
/// `mutation_rate` by N(0, magnitude * range), then clamped.
pub fn mutate<R: Rng>(
    vector: &ParameterVector,
    mutation_rate: f64,
    magnitude: f64,
    schema: &ParameterSchema,
    rng: &mut R,
) -> ParameterVector {
    let values: Vec<f64> = vector
        .iter()
        .zip(schema.parameters())
        .map(|(&value, bounds)| {
            if rng.gen::<f64>() < mutation_rate {
                value + gaussian(magnitude * bounds.range(), rng)
            } else {
                value
            }
        })
        .collect();

    schema.clamp_to_bounds(&values)
}

/// Perturb a single random component by N(0, scale * range)
pub fn perturb_one<R: Rng>(
    vector: &ParameterVector,
    scale: f64,
    schema: &ParameterSchema,
    rng: &mut R,
) -> ParameterVector {
    let idx = rng.gen_range(0..vector.len());
    let mut values = vector.to_vec();
    let range = schema.parameters()[idx].range();
    values[idx] += gaussian(scale * range, rng);
    schema.clamp_to_bounds(&values)
}

/// Zero-mean normal draw; a non-positive deviation yields 0
pub fn gaussian<R: Rng>(std_dev: f64, rng: &mut R) -> f64 {
    match Normal::new(0.0, std_dev) {
        Ok(normal) if std_dev > 0.0 => normal.sample(rng),
        _ => 0.0,
    }
}
