//! The makespan evaluator: a single forward pass over a solution's operation
//! order producing per-machine completion times and the overall makespan.
//!
//! O(T) time, O(J + M) auxiliary state, as required by the component design:
//! one pass over the row order, tracking each job's next-ready time and each
//! machine's next-ready time plus its last-scheduled operation (for setup
//! lookup). Deterministic — identical instance and row order always produce
//! a bitwise identical result.

use crate::instance::Instance;
use crate::solution::OpRow;

/// Result of evaluating a solution's row order against an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Overall makespan: the latest machine-ready time across all machines.
    pub makespan: f64,
    /// Time at which each machine becomes free after its last operation.
    pub machine_ready: Vec<f64>,
}

/// Simulates `rows` in order against `instance`, producing the resulting
/// makespan and per-machine completion times.
///
/// `rows` is assumed to satisfy the feasibility invariants (each (job, task)
/// appears once, in job-ascending order, on a usable machine); this function
/// does not re-validate them — see [`crate::solution::Solution::is_feasible`].
pub fn evaluate(instance: &Instance, rows: &[OpRow]) -> Evaluation {
    let num_jobs = instance.num_jobs();
    let num_machines = instance.num_machines();

    let mut job_ready = vec![0.0f64; num_jobs];
    let mut machine_ready = vec![0.0f64; num_machines];
    let mut last_on_machine: Vec<Option<usize>> = vec![None; num_machines];

    for row in rows {
        let op = instance
            .index_of(row.job, row.task)
            .expect("row references an operation outside the instance");

        let setup = instance.setup_time(last_on_machine[row.machine], op) as f64;
        let ready = job_ready[row.job].max(machine_ready[row.machine]);
        let start = ready + setup;
        let finish = start + instance.proc_time(op, row.machine);

        job_ready[row.job] = finish;
        machine_ready[row.machine] = finish;
        last_on_machine[row.machine] = Some(op);
    }

    let makespan = machine_ready.iter().cloned().fold(0.0, f64::max);
    Evaluation {
        makespan,
        machine_ready,
    }
}
