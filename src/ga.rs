//! Genetic Algorithm engine.
//!
//! An individual is a [`Solution`] — its row order and per-row machine field
//! together already encode both the operation sequence and the machine
//! assignment, so there is a single vector to select, cross over, and
//! mutate rather than the two parallel vectors a split OSV/MAV encoding
//! would need kept in sync.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::instance::Instance;
use crate::neighbor::machine_reassignment;
use crate::solution::Solution;

/// Genetic Algorithm tuning parameters.
#[derive(Debug, Clone)]
pub struct GaConfig {
    pub population_size: usize,
    /// Tournament sample size, `k`.
    pub tournament_k: usize,
    /// Per-offspring mutation probability, `μ`.
    pub mutation_rate: f64,
    pub max_generations: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            tournament_k: 3,
            mutation_rate: 0.1,
            max_generations: Some(500),
            max_duration: None,
        }
    }
}

/// Result of running the GA to completion.
#[derive(Debug, Clone)]
pub struct GaResult {
    pub best: Solution,
    pub generations_run: usize,
}

/// Selects a single individual from `population` by tournament: sample
/// `k` indices with replacement, return the one with the lowest makespan.
fn tournament_select(
    instance: &Instance,
    population: &[Solution],
    k: usize,
    rng: &mut impl Rng,
) -> usize {
    let mut best_idx = rng.random_range(0..population.len());
    let mut best_m = population[best_idx].makespan_uncached(instance);
    for _ in 1..k {
        let idx = rng.random_range(0..population.len());
        let m = population[idx].makespan_uncached(instance);
        if m < best_m {
            best_m = m;
            best_idx = idx;
        }
    }
    best_idx
}

/// Single-cut-point, precedence-preserving crossover.
///
/// The child takes `parent1`'s rows up to `cut` verbatim, then appends the
/// remaining (job, task) operations in the order `parent2` visits them.
/// Because every solution's rows list each job's tasks in ascending order,
/// any prefix of `parent1` contains exactly the first `m_j` tasks of each
/// job `j` for some `m_j` — so the complementary tasks taken from `parent2`
/// form a genuine suffix, and the concatenation still respects each job's
/// task order.
pub fn crossover(parent1: &Solution, parent2: &Solution, cut: usize) -> Solution {
    use std::collections::HashSet;

    let mut rows = parent1.rows()[..cut].to_vec();
    let mut placed: HashSet<(usize, usize)> = rows.iter().map(|r| (r.job, r.task)).collect();

    for row in parent2.rows() {
        let key = (row.job, row.task);
        if placed.insert(key) {
            rows.push(*row);
        }
    }

    Solution::from_rows(rows)
}

/// Applies machine-reassignment mutation to `solution` with probability
/// `config.mutation_rate`. No OSV-level (order) mutation is performed.
fn mutate(instance: &Instance, solution: Solution, rate: f64, rng: &mut impl Rng) -> Solution {
    if rng.random_bool(rate) {
        machine_reassignment(instance, &solution, rng).unwrap_or(solution)
    } else {
        solution
    }
}

/// Runs the GA from `population` until a stopping condition fires, using
/// steady-state replacement: each generation produces one child and, if it
/// strictly improves on the population's current worst individual, replaces
/// it. The population's best individual therefore can only improve or stay
/// put across generations (automatic elitism).
pub fn run(
    instance: &Instance,
    mut population: Vec<Solution>,
    config: &GaConfig,
    rng: &mut impl Rng,
) -> GaResult {
    assert!(!population.is_empty(), "population must be non-empty");

    let start = Instant::now();
    let mut generation = 0usize;

    loop {
        if let Some(max_gen) = config.max_generations {
            if generation >= max_gen {
                break;
            }
        }
        if let Some(max_dur) = config.max_duration {
            if start.elapsed() >= max_dur {
                break;
            }
        }

        let p1 = tournament_select(instance, &population, config.tournament_k, rng);
        let p2 = tournament_select(instance, &population, config.tournament_k, rng);
        let cut = if population[p1].len() > 1 {
            rng.random_range(1..population[p1].len())
        } else {
            0
        };
        let child = crossover(&population[p1], &population[p2], cut);
        let mut child = mutate(instance, child, config.mutation_rate, rng);
        let child_makespan = child.makespan(instance);

        let (worst_idx, worst_makespan) = population
            .iter_mut()
            .enumerate()
            .map(|(i, s)| (i, s.makespan(instance)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("population is non-empty");

        if child_makespan < worst_makespan {
            population[worst_idx] = child;
        }

        generation += 1;
    }

    let best = population
        .into_iter()
        .min_by(|a, b| a.cmp_by_makespan(b, instance))
        .expect("population is non-empty");

    GaResult {
        best,
        generations_run: generation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn toy_instance() -> Instance {
        Instance::new(
            vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1]],
            2,
            vec![vec![true, true]; 8],
            vec![vec![2.0, 3.0]; 8],
            vec![vec![1; 8]; 8],
        )
        .unwrap()
    }

    #[test]
    fn crossover_child_is_feasible() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(5);
        let p1 = Solution::random_feasible(&inst, &mut rng);
        let p2 = Solution::random_feasible(&inst, &mut rng);
        for cut in 1..p1.len() {
            let child = crossover(&p1, &p2, cut);
            assert!(child.is_feasible(&inst), "cut={cut}");
        }
    }

    #[test]
    fn ga_never_worsens_best() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(6);
        let population: Vec<Solution> = (0..10)
            .map(|_| Solution::random_feasible(&inst, &mut rng))
            .collect();
        let initial_best = population
            .iter()
            .map(|s| s.makespan_uncached(&inst))
            .fold(f64::INFINITY, f64::min);

        let config = GaConfig {
            max_generations: Some(200),
            ..GaConfig::default()
        };
        let result = run(&inst, population, &config, &mut rng);
        assert!(result.best.makespan_uncached(&inst) <= initial_best);
    }
}
