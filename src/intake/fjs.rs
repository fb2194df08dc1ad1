//! Single-file `.fjs` intake format, and the `fjs_to_csv` conversion
//! utility.
//!
//! Grounded on `JSSP/data.py`'s `FJSData.__init__` and
//! `Data.convert_fjs_to_csv`: the first non-blank line is
//! `num_jobs num_machines <ignored>`; each following line is one job,
//! `num_tasks` followed by, per task, `num_usable_machines` then that many
//! `(machine_1indexed, runtime)` pairs. Machine ids are converted to
//! zero-indexed on read. The setup matrix has no FJS representation, so it
//! reads as all zero, same as the conversion utility emits.

use std::fs;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::instance::Instance;

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn split_ints(line: &str) -> CoreResult<Vec<i64>> {
    line.split_whitespace()
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| CoreError::InputMalformed(format!("{e}: {s}")))
        })
        .collect()
}

struct FjsTask {
    /// `(machine, runtime)` pairs, machines zero-indexed.
    pairs: Vec<(usize, i64)>,
}

struct Fjs {
    num_machines: usize,
    jobs: Vec<Vec<FjsTask>>,
}

fn parse_fjs(text: &str) -> CoreResult<Fjs> {
    let lines = non_blank_lines(text);
    if lines.is_empty() {
        return Err(CoreError::InputMalformed("fjs file is empty".into()));
    }
    let header = split_ints(lines[0])?;
    if header.len() < 2 {
        return Err(CoreError::InputMalformed(
            "fjs header line must have at least num_jobs and num_machines".into(),
        ));
    }
    let num_machines = header[1] as usize;

    let mut jobs = Vec::with_capacity(lines.len().saturating_sub(1));
    for line in &lines[1..] {
        let data = split_ints(line)?;
        let mut tasks = Vec::new();
        let mut i = 1usize;
        while i < data.len() {
            let num_usable = data[i] as usize;
            let mut pairs = Vec::with_capacity(num_usable);
            let mut j = i + 1;
            for _ in 0..num_usable {
                let machine = data[j] as usize - 1;
                let runtime = data[j + 1];
                pairs.push((machine, runtime));
                j += 2;
            }
            tasks.push(FjsTask { pairs });
            i += num_usable * 2 + 1;
        }
        jobs.push(tasks);
    }

    Ok(Fjs { num_machines, jobs })
}

/// Reads a `.fjs` file and builds an [`Instance`].
pub fn read_fjs(path: impl AsRef<Path>) -> CoreResult<Instance> {
    let text = fs::read_to_string(path.as_ref())
        .map_err(|e| CoreError::InputMalformed(format!("reading fjs file: {e}")))?;
    let parsed = parse_fjs(&text)?;

    let jobs: Vec<Vec<usize>> = parsed
        .jobs
        .iter()
        .map(|tasks| vec![0usize; tasks.len()])
        .collect();
    let num_ops: usize = parsed.jobs.iter().map(|j| j.len()).sum();

    let mut usable = Vec::with_capacity(num_ops);
    let mut proc_time = Vec::with_capacity(num_ops);
    for job_tasks in &parsed.jobs {
        for task in job_tasks {
            let mut usable_row = vec![false; parsed.num_machines];
            let mut proc_row = vec![0.0f64; parsed.num_machines];
            for &(machine, runtime) in &task.pairs {
                if machine >= parsed.num_machines {
                    return Err(CoreError::InputMalformed(format!(
                        "task references unknown machine {machine}"
                    )));
                }
                usable_row[machine] = true;
                proc_row[machine] = runtime as f64;
            }
            usable.push(usable_row);
            proc_time.push(proc_row);
        }
    }
    let setup = vec![vec![0i64; num_ops]; num_ops];

    Instance::new(jobs, parsed.num_machines, usable, proc_time, setup)
}

/// Converts a `.fjs` file into the three-file CSV intake format, written
/// into `output_dir` as `jobTasks.csv`, `machineRunSpeed.csv`, and
/// `sequenceDependencyMatrix.csv`.
///
/// Matches `convert_fjs_to_csv` exactly, including its lossy detail: each
/// task's `Pieces` column is the runtime of its *first* listed usable
/// machine (with `RunSpeed = 1` for every machine, dividing by speed is a
/// no-op, so this is the value every usable machine's processing time comes
/// out to after a CSV round trip) and the setup matrix is written as all
/// zero.
pub fn fjs_to_csv(fjs_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> CoreResult<()> {
    let text = fs::read_to_string(fjs_path.as_ref())
        .map_err(|e| CoreError::InputMalformed(format!("reading fjs file: {e}")))?;
    let parsed = parse_fjs(&text)?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .map_err(|e| CoreError::InputMalformed(format!("creating output dir: {e}")))?;

    let mut job_tasks = String::from("Job,Task,Sequence,Usable_Machines,Pieces\n");
    for (job_id, tasks) in parsed.jobs.iter().enumerate() {
        for (task_id, task) in tasks.iter().enumerate() {
            let machines: Vec<String> = task.pairs.iter().map(|(m, _)| m.to_string()).collect();
            let pieces = task.pairs.first().map(|(_, r)| *r).unwrap_or(0);
            job_tasks.push_str(&format!(
                "{job_id},{task_id},{task_id},[{}],{pieces}\n",
                machines.join(" ")
            ));
        }
    }
    fs::write(output_dir.join("jobTasks.csv"), job_tasks)
        .map_err(|e| CoreError::InputMalformed(format!("writing jobTasks.csv: {e}")))?;

    let mut machine_speeds = String::from("Machine,RunSpeed\n");
    for m in 0..parsed.num_machines {
        machine_speeds.push_str(&format!("{m},1\n"));
    }
    fs::write(output_dir.join("machineRunSpeed.csv"), machine_speeds)
        .map_err(|e| CoreError::InputMalformed(format!("writing machineRunSpeed.csv: {e}")))?;

    let num_ops: usize = parsed.jobs.iter().map(|j| j.len()).sum();
    let mut row = String::new();
    row.push_str(&"0,".repeat(num_ops));
    row.push_str("0\n");
    // num_ops + 1 identical all-zero lines: the intake reader discards the
    // first as a header, leaving exactly num_ops data rows.
    let mut out = String::with_capacity(row.len() * (num_ops + 1));
    for _ in 0..=num_ops {
        out.push_str(&row);
    }
    fs::write(output_dir.join("sequenceDependencyMatrix.csv"), out).map_err(|e| {
        CoreError::InputMalformed(format!("writing sequenceDependencyMatrix.csv: {e}"))
    })?;

    Ok(())
}
