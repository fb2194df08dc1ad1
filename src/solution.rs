//! The `Solution` encoding: an ordered sequence of operation rows, each
//! naming a (job, task, machine) triple, plus a lazily-computed makespan
//! cache.
//!
//! A solution's row order doubles as both the teacher's operation-sequence
//! vector and machine-assignment vector — each row already carries its own
//! machine, so there is one array to mutate and validate instead of two kept
//! in sync by hand.

use std::cmp::Ordering;

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::evaluator::{evaluate, Evaluation};
use crate::instance::Instance;

/// One scheduled operation: job, task-within-job, and assigned machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpRow {
    pub job: usize,
    pub task: usize,
    pub machine: usize,
}

/// A candidate schedule: an ordering of every operation plus its machine
/// assignment, with a cache of its evaluated makespan.
#[derive(Debug, Clone)]
pub struct Solution {
    rows: Vec<OpRow>,
    cache: Option<Evaluation>,
}

impl Solution {
    /// Builds a solution from a row order, without validating feasibility.
    /// Callers that didn't construct `rows` themselves should call
    /// [`Solution::is_feasible`] before relying on it.
    pub fn from_rows(rows: Vec<OpRow>) -> Self {
        Self { rows, cache: None }
    }

    /// Generates a random feasible solution: jobs' operations are emitted in
    /// a random interleaving that preserves each job's internal task order
    /// (invariant 2), with each operation assigned a uniformly random usable
    /// machine (invariant 3).
    pub fn random_feasible(instance: &Instance, rng: &mut impl Rng) -> Self {
        let mut cursor = vec![0usize; instance.num_jobs()];
        let mut remaining: Vec<usize> = (0..instance.num_jobs())
            .filter(|&j| instance.tasks_in_job(j) > 0)
            .collect();
        let mut rows = Vec::with_capacity(instance.num_ops());

        while !remaining.is_empty() {
            let pick = rng.random_range(0..remaining.len());
            let job = remaining[pick];
            let task = cursor[job];
            let machines = instance.usable_machines(instance.index_of(job, task).unwrap());
            let machine = *machines
                .choose(rng)
                .expect("operation has no usable machine");
            rows.push(OpRow { job, task, machine });

            cursor[job] += 1;
            if cursor[job] >= instance.tasks_in_job(job) {
                remaining.swap_remove(pick);
            }
        }

        Self { rows, cache: None }
    }

    pub fn rows(&self) -> &[OpRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks the three feasibility invariants: every (job, task) appears
    /// exactly once, within-job order matches ascending task index, and
    /// every assigned machine is usable for its operation.
    pub fn is_feasible(&self, instance: &Instance) -> bool {
        use std::collections::HashSet;

        if self.rows.len() != instance.num_ops() {
            return false;
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(self.rows.len());
        let mut last_task: Vec<Option<usize>> = vec![None; instance.num_jobs()];

        for row in &self.rows {
            if row.job >= instance.num_jobs() || row.task >= instance.tasks_in_job(row.job) {
                return false;
            }
            if !seen.insert((row.job, row.task)) {
                return false;
            }
            match last_task[row.job] {
                Some(prev) if row.task != prev + 1 => return false,
                None if row.task != 0 => return false,
                _ => {}
            }
            last_task[row.job] = Some(row.task);

            let op = match instance.index_of(row.job, row.task) {
                Some(op) => op,
                None => return false,
            };
            if !instance.is_usable(op, row.machine) {
                return false;
            }
        }

        seen.len() == instance.num_ops()
    }

    /// Evaluated makespan, computing and caching it on first access.
    pub fn makespan(&mut self, instance: &Instance) -> f64 {
        self.evaluation(instance).makespan
    }

    /// Evaluated makespan without mutating the cache (recomputes every call).
    pub fn makespan_uncached(&self, instance: &Instance) -> f64 {
        evaluate(instance, &self.rows).makespan
    }

    fn evaluation(&mut self, instance: &Instance) -> &Evaluation {
        if self.cache.is_none() {
            self.cache = Some(evaluate(instance, &self.rows));
        }
        self.cache.as_ref().unwrap()
    }

    /// Reassigns the machine of row `idx`, invalidating the makespan cache.
    pub fn set_machine(&mut self, idx: usize, machine: usize) {
        self.rows[idx].machine = machine;
        self.cache = None;
    }

    /// Swaps two rows' (job, task, machine) triples in place, invalidating
    /// the cache. Callers are responsible for only swapping rows where doing
    /// so preserves feasibility (see the adjacent cross-job swap move in
    /// [`crate::neighbor`]).
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
        self.cache = None;
    }

    /// A 64-bit fingerprint of the row order, used as the tabu-list state
    /// key. Collisions are acceptable — an occasional false "this move is
    /// tabu" costs nothing but a missed candidate.
    pub fn fingerprint(&self) -> u64 {
        // FNV-1a over the (job, task, machine) triples.
        let mut hash: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;
        for row in &self.rows {
            for word in [row.job as u64, row.task as u64, row.machine as u64] {
                for byte in word.to_le_bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(PRIME);
                }
            }
        }
        hash
    }

    /// The row sequence as `(machine, job, task)` triples, in row order —
    /// the lexicographic tie-break key used by [`Solution::cmp_by_makespan`].
    fn lexicographic_key(&self) -> Vec<(usize, usize, usize)> {
        self.rows
            .iter()
            .map(|r| (r.machine, r.job, r.task))
            .collect()
    }

    /// Total order by makespan, tie-broken by the lexicographic
    /// `(machine, job, task)` row sequence so two distinct solutions with
    /// equal makespan never compare equal unless their rows are actually
    /// identical, and the tie-break order is reproducible rather than
    /// hash-dependent.
    pub fn cmp_by_makespan(&self, other: &Self, instance: &Instance) -> Ordering {
        let a = self.makespan_uncached(instance);
        let b = other.makespan_uncached(instance);
        a.total_cmp(&b)
            .then_with(|| self.lexicographic_key().cmp(&other.lexicographic_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn toy_instance() -> Instance {
        // 2 jobs x 2 tasks, 2 machines, both usable everywhere, zero setup.
        Instance::new(
            vec![vec![0, 1], vec![0, 1]],
            2,
            vec![vec![true, true]; 4],
            vec![vec![1.0, 2.0]; 4],
            vec![vec![0; 4]; 4],
        )
        .unwrap()
    }

    #[test]
    fn random_feasible_satisfies_invariants() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let sol = Solution::random_feasible(&inst, &mut rng);
            assert!(sol.is_feasible(&inst));
        }
    }

    #[test]
    fn makespan_cache_matches_uncached() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sol = Solution::random_feasible(&inst, &mut rng);
        let cached = sol.makespan(&inst);
        let uncached = sol.makespan_uncached(&inst);
        assert_eq!(cached, uncached);
    }

    #[test]
    fn mutation_invalidates_cache() {
        let inst = toy_instance();
        let mut sol = Solution::from_rows(vec![
            OpRow {
                job: 0,
                task: 0,
                machine: 0,
            },
            OpRow {
                job: 1,
                task: 0,
                machine: 1,
            },
            OpRow {
                job: 0,
                task: 1,
                machine: 0,
            },
            OpRow {
                job: 1,
                task: 1,
                machine: 1,
            },
        ]);
        let before = sol.makespan(&inst);
        sol.set_machine(0, 1);
        let after = sol.makespan(&inst);
        assert_ne!(before, after);
    }

    #[test]
    fn cmp_by_makespan_tie_breaks_lexicographically_by_machine_job_task() {
        let inst = toy_instance();
        // Same makespan (both rows run machine 0 then machine 1 on the same
        // job pairing), but the two solutions assign machine 0 to a
        // different (job, task) first.
        let lower = Solution::from_rows(vec![
            OpRow {
                job: 0,
                task: 0,
                machine: 0,
            },
            OpRow {
                job: 1,
                task: 0,
                machine: 1,
            },
            OpRow {
                job: 0,
                task: 1,
                machine: 0,
            },
            OpRow {
                job: 1,
                task: 1,
                machine: 1,
            },
        ]);
        let higher = Solution::from_rows(vec![
            OpRow {
                job: 1,
                task: 0,
                machine: 0,
            },
            OpRow {
                job: 0,
                task: 0,
                machine: 1,
            },
            OpRow {
                job: 1,
                task: 1,
                machine: 0,
            },
            OpRow {
                job: 0,
                task: 1,
                machine: 1,
            },
        ]);
        assert_eq!(
            lower.makespan_uncached(&inst),
            higher.makespan_uncached(&inst)
        );
        assert_eq!(lower.cmp_by_makespan(&higher, &inst), Ordering::Less);
        assert_eq!(higher.cmp_by_makespan(&lower, &inst), Ordering::Greater);
        assert_eq!(lower.cmp_by_makespan(&lower, &inst), Ordering::Equal);
    }
}
