//! A decode-only, presentation-facing view of an evaluated [`Solution`].
//!
//! External reporters (HTML, spreadsheet export, progress bars) consume a
//! [`Report`] instead of re-deriving timings by walking raw solution rows.
//! Grounded on the teacher's `models::Schedule`/`Assignment` pair,
//! generalized from string-keyed assignments to this crate's flat operation
//! indices.

use serde::{Deserialize, Serialize};

use crate::instance::Instance;
use crate::solution::{OpRow, Solution};

/// One operation's realized timing in a decoded schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOp {
    pub job: usize,
    pub task: usize,
    pub machine: usize,
    pub setup: f64,
    pub start: f64,
    pub finish: f64,
}

/// Per-machine utilization summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineSummary {
    pub machine: usize,
    pub busy_time: f64,
    pub idle_time: f64,
}

/// A fully decoded schedule, ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub makespan: f64,
    pub ops: Vec<ScheduledOp>,
    pub machines: Vec<MachineSummary>,
}

/// Decodes `solution` against `instance` into a [`Report`].
pub fn build_report(instance: &Instance, solution: &Solution) -> Report {
    let num_jobs = instance.num_jobs();
    let num_machines = instance.num_machines();

    let mut job_ready = vec![0.0f64; num_jobs];
    let mut machine_ready = vec![0.0f64; num_machines];
    let mut last_on_machine: Vec<Option<usize>> = vec![None; num_machines];
    let mut ops = Vec::with_capacity(solution.len());

    for &OpRow { job, task, machine } in solution.rows() {
        let op = instance
            .index_of(job, task)
            .expect("row references an operation outside the instance");

        let setup = instance.setup_time(last_on_machine[machine], op) as f64;
        let ready = job_ready[job].max(machine_ready[machine]);
        let start = ready + setup;
        let finish = start + instance.proc_time(op, machine);

        job_ready[job] = finish;
        machine_ready[machine] = finish;
        last_on_machine[machine] = Some(op);

        ops.push(ScheduledOp {
            job,
            task,
            machine,
            setup,
            start,
            finish,
        });
    }

    let makespan = machine_ready.iter().cloned().fold(0.0, f64::max);
    let machines = (0..num_machines)
        .map(|m| MachineSummary {
            machine: m,
            busy_time: ops
                .iter()
                .filter(|o| o.machine == m)
                .map(|o| o.finish - o.start)
                .sum(),
            idle_time: makespan - machine_ready[m],
        })
        .collect();

    Report {
        makespan,
        ops,
        machines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::OpRow;

    #[test]
    fn report_makespan_matches_evaluator() {
        let instance = Instance::new(
            vec![vec![0, 1], vec![0, 1]],
            2,
            vec![vec![true, true]; 4],
            vec![vec![1.0, 2.0]; 4],
            vec![vec![0; 4]; 4],
        )
        .unwrap();
        let solution = Solution::from_rows(vec![
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
        let report = build_report(&instance, &solution);
        assert_eq!(report.makespan, solution.makespan_uncached(&instance));
        assert_eq!(report.ops.len(), 4);
    }
}
