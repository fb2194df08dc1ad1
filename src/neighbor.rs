//! Single-move perturbations over a [`Solution`], and the timed neighborhood
//! expansion used by the Tabu Search worker.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::instance::Instance;
use crate::solution::Solution;

/// Probability of proposing a machine-reassignment move versus an
/// adjacent cross-job swap, per call to [`propose_move`].
pub const DEFAULT_P_CHANGE_MACHINE: f64 = 0.7;

/// Reassigns one operation to a different usable machine.
///
/// Returns `None` if the operation has only one usable machine (no move is
/// possible).
pub fn machine_reassignment(
    instance: &Instance,
    solution: &Solution,
    rng: &mut impl Rng,
) -> Option<Solution> {
    let idx = rng.random_range(0..solution.len());
    let row = solution.rows()[idx];
    let op = instance.index_of(row.job, row.task)?;
    let alternatives: Vec<usize> = instance
        .usable_machines(op)
        .into_iter()
        .filter(|&m| m != row.machine)
        .collect();
    let &machine = alternatives.get(rng.random_range(0..alternatives.len().max(1)))?;

    let mut next = solution.clone();
    next.set_machine(idx, machine);
    Some(next)
}

/// Swaps the (job, task, machine) assignment of two adjacent rows that
/// belong to different jobs.
///
/// Adjacent-and-cross-job is the feasibility-preserving case resolved in
/// `DESIGN.md`: neither operand moves relative to its own job's other
/// tasks, so invariant 2 (within-job order) can't be violated. Returns
/// `None` if no such pair exists (e.g. a single-job instance).
pub fn adjacent_swap(solution: &Solution, rng: &mut impl Rng) -> Option<Solution> {
    let rows = solution.rows();
    if rows.len() < 2 {
        return None;
    }
    let candidates: Vec<usize> = (0..rows.len() - 1)
        .filter(|&i| rows[i].job != rows[i + 1].job)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let i = candidates[rng.random_range(0..candidates.len())];

    let mut next = solution.clone();
    next.swap_rows(i, i + 1);
    Some(next)
}

/// Proposes one feasibility-preserving neighbor of `solution`, choosing
/// between a machine reassignment (probability `p_change_machine`) and an
/// adjacent cross-job swap.
pub fn propose_move(
    instance: &Instance,
    solution: &Solution,
    p_change_machine: f64,
    rng: &mut impl Rng,
) -> Option<Solution> {
    if rng.random_bool(p_change_machine) {
        machine_reassignment(instance, solution, rng).or_else(|| adjacent_swap(solution, rng))
    } else {
        adjacent_swap(solution, rng).or_else(|| machine_reassignment(instance, solution, rng))
    }
}

/// Consecutive already-seen proposals tolerated before giving up early, as a
/// multiple of `target`. On a small instance whose distinct-move space is
/// smaller than `target`, this avoids busy-waiting the full `deadline` on
/// every call once the space is exhausted.
const STALL_PATIENCE_FACTOR: usize = 20;

/// Expands a neighborhood of up to `target` distinct (by fingerprint)
/// neighbors of `solution`, stopping early once `deadline` elapses or the
/// distinct-move space appears exhausted.
///
/// A partial batch — fewer than `target` neighbors — is a valid result, not
/// an error: the caller (the Tabu Search worker) treats whatever was found
/// within the time budget as the neighborhood for this iteration.
pub fn expand_neighborhood(
    instance: &Instance,
    solution: &Solution,
    target: usize,
    deadline: Duration,
    p_change_machine: f64,
    rng: &mut impl Rng,
) -> Vec<Solution> {
    let start = Instant::now();
    let mut seen = std::collections::HashSet::with_capacity(target);
    let mut out = Vec::with_capacity(target);
    let stall_limit = target.saturating_mul(STALL_PATIENCE_FACTOR).max(50);
    let mut stall = 0usize;

    while out.len() < target && start.elapsed() < deadline {
        let Some(candidate) = propose_move(instance, solution, p_change_machine, rng) else {
            break;
        };
        if seen.insert(candidate.fingerprint()) {
            out.push(candidate);
            stall = 0;
        } else {
            stall += 1;
            if stall >= stall_limit {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn toy_instance() -> Instance {
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
    fn moves_preserve_feasibility() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let base = Solution::random_feasible(&inst, &mut rng);
            if let Some(n) = propose_move(&inst, &base, 0.5, &mut rng) {
                assert!(n.is_feasible(&inst));
            }
        }
    }

    #[test]
    fn neighborhood_expansion_gives_up_early_on_exhausted_space() {
        // A tiny instance where the distinct-move space is far smaller than
        // the requested target: expansion must not busy-wait the full
        // deadline once it stalls on repeats.
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(8);
        let base = Solution::random_feasible(&inst, &mut rng);
        let start = std::time::Instant::now();
        let _ = expand_neighborhood(&inst, &base, 1000, Duration::from_secs(5), 0.7, &mut rng);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn neighborhood_expansion_respects_target() {
        let inst = toy_instance();
        let mut rng = SmallRng::seed_from_u64(4);
        let base = Solution::random_feasible(&inst, &mut rng);
        let neighbors =
            expand_neighborhood(&inst, &base, 5, Duration::from_millis(200), 0.7, &mut rng);
        assert!(neighbors.len() <= 5);
        for n in &neighbors {
            assert!(n.is_feasible(&inst));
        }
    }
}
