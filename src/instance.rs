//! The immutable problem definition: jobs, operations, usable machines,
//! processing times, and sequence-dependent setup times.
//!
//! Data lives in flat, row-major buffers rather than nested maps — the
//! evaluator and neighbor generator are hot loops over a few thousand
//! operations, and a `Vec<f64>` indexed by `t * num_machines + m` keeps them
//! cache-friendly and allocation-free.

use crate::error::{CoreError, CoreResult};

/// A no-predecessor / idle-machine sentinel: setup cost is 0 when the
/// previous operation on a machine is absent.
pub const NO_PREDECESSOR: Option<usize> = None;

/// An immutable SDST-FJSP instance.
#[derive(Debug, Clone)]
pub struct Instance {
    num_jobs: usize,
    num_machines: usize,
    num_ops: usize,
    /// Job id of operation `t`.
    job_of: Vec<usize>,
    /// Task (sequence position within the job) of operation `t`.
    task_of: Vec<usize>,
    /// `index_of[job][task] = t`, flat operation index.
    index_of: Vec<Vec<usize>>,
    /// `usable[t * num_machines + m]`.
    usable: Vec<bool>,
    /// `proc_time[t * num_machines + m]`, valid iff `usable[t][m]`.
    proc_time: Vec<f64>,
    /// `setup[a * num_ops + b]`, non-negative setup minutes charged on the
    /// machine running `b` when its previous operation was `a`.
    setup: Vec<i64>,
}

impl Instance {
    /// Builds an instance from already-validated flat buffers.
    ///
    /// Intake modules ([`crate::intake`]) are the normal way to construct an
    /// `Instance`; this constructor is for tests and for callers who already
    /// have the data in memory.
    pub fn new(
        jobs: Vec<Vec<usize>>,
        num_machines: usize,
        usable: Vec<Vec<bool>>,
        proc_time: Vec<Vec<f64>>,
        setup: Vec<Vec<i64>>,
    ) -> CoreResult<Self> {
        let num_jobs = jobs.len();
        let num_ops: usize = jobs.iter().map(|j| j.len()).sum();

        if usable.len() != num_ops || proc_time.len() != num_ops {
            return Err(CoreError::InputMalformed(
                "usable/proc_time row count must equal total operation count".into(),
            ));
        }
        if setup.len() != num_ops || setup.iter().any(|row| row.len() != num_ops) {
            return Err(CoreError::InputMalformed(
                "setup matrix must be num_ops x num_ops".into(),
            ));
        }

        let mut job_of = Vec::with_capacity(num_ops);
        let mut task_of = Vec::with_capacity(num_ops);
        let mut index_of = Vec::with_capacity(num_jobs);
        let mut t = 0usize;
        for (j, task_ids) in jobs.iter().enumerate() {
            let mut row = Vec::with_capacity(task_ids.len());
            for _ in task_ids {
                row.push(t);
                job_of.push(j);
                task_of.push(row.len() - 1);
                t += 1;
            }
            index_of.push(row);
        }

        let mut flat_usable = vec![false; num_ops * num_machines];
        let mut flat_proc = vec![0.0; num_ops * num_machines];
        for op in 0..num_ops {
            if usable[op].len() != num_machines || proc_time[op].len() != num_machines {
                return Err(CoreError::InputMalformed(
                    "usable/proc_time columns must equal machine count".into(),
                ));
            }
            if !usable[op].iter().any(|&u| u) {
                return Err(CoreError::InfeasibleInstance(format!(
                    "operation {op} has no usable machine"
                )));
            }
            for m in 0..num_machines {
                flat_usable[op * num_machines + m] = usable[op][m];
                flat_proc[op * num_machines + m] = proc_time[op][m];
            }
        }

        let mut flat_setup = vec![0i64; num_ops * num_ops];
        for a in 0..num_ops {
            for b in 0..num_ops {
                let s = setup[a][b];
                if s < 0 {
                    return Err(CoreError::InputMalformed(format!(
                        "negative setup time at ({a}, {b})"
                    )));
                }
                flat_setup[a * num_ops + b] = s;
            }
        }

        Ok(Self {
            num_jobs,
            num_machines,
            num_ops,
            job_of,
            task_of,
            index_of,
            usable: flat_usable,
            proc_time: flat_proc,
            setup: flat_setup,
        })
    }

    pub fn num_jobs(&self) -> usize {
        self.num_jobs
    }

    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    pub fn num_ops(&self) -> usize {
        self.num_ops
    }

    pub fn job_of(&self, op: usize) -> usize {
        self.job_of[op]
    }

    pub fn task_of(&self, op: usize) -> usize {
        self.task_of[op]
    }

    pub fn tasks_in_job(&self, job: usize) -> usize {
        self.index_of[job].len()
    }

    /// Flat operation index for the `task`-th task of `job`, or `None` if out
    /// of range.
    pub fn index_of(&self, job: usize, task: usize) -> Option<usize> {
        self.index_of.get(job)?.get(task).copied()
    }

    pub fn is_usable(&self, op: usize, machine: usize) -> bool {
        self.usable[op * self.num_machines + machine]
    }

    /// Usable machines for `op`, in ascending order.
    pub fn usable_machines(&self, op: usize) -> Vec<usize> {
        (0..self.num_machines)
            .filter(|&m| self.is_usable(op, m))
            .collect()
    }

    /// Processing time of `op` on `machine`. Only meaningful when
    /// `is_usable(op, machine)`.
    pub fn proc_time(&self, op: usize, machine: usize) -> f64 {
        self.proc_time[op * self.num_machines + machine]
    }

    /// Setup time charged on a machine running `op` whose previous operation
    /// on that machine was `prev` (`None` for an idle/no-predecessor start).
    pub fn setup_time(&self, prev: Option<usize>, op: usize) -> i64 {
        match prev {
            None => 0,
            Some(a) => self.setup[a * self.num_ops + op],
        }
    }
}
