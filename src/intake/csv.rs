//! CSV triple intake: `jobTasks.csv`, `machineRunSpeed.csv`, and
//! `sequenceDependencyMatrix.csv`.
//!
//! Column layout and the header-skipping, space-delimited usable-machines
//! bracket format (`"[0 1 2]"`) are grounded on `JSSP/data.py`'s
//! `CSVData._read_job_tasks_file` / `_read_sequence_dependency_matrix_file` /
//! `_read_machine_speeds_file`. All three files assume jobs appear in
//! ascending order and in the same task order as the setup matrix rows.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::instance::Instance;

struct TaskRow {
    job: usize,
    task: usize,
    usable_machines: Vec<usize>,
    pieces: f64,
}

fn malformed(context: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::InputMalformed(format!("{context}: {err}"))
}

fn read_job_tasks(path: &Path) -> CoreResult<Vec<TaskRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed("jobTasks.csv", e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed("jobTasks.csv row", e))?;
        if record.len() < 5 {
            return Err(CoreError::InputMalformed(
                "jobTasks.csv row must have 5 columns".into(),
            ));
        }
        let job: usize = record[0].parse().map_err(|e| malformed("job id", e))?;
        let task: usize = record[1].parse().map_err(|e| malformed("task id", e))?;
        let bracket = record[3].trim();
        let inner = bracket
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| {
                CoreError::InputMalformed(format!(
                    "usable machines field must be bracketed: {bracket}"
                ))
            })?;
        let usable_machines = inner
            .split_whitespace()
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|e| malformed("usable machine id", e))
            })
            .collect::<CoreResult<Vec<usize>>>()?;
        let pieces: f64 = record[4].parse().map_err(|e| malformed("pieces", e))?;

        rows.push(TaskRow {
            job,
            task,
            usable_machines,
            pieces,
        });
    }
    Ok(rows)
}

fn read_machine_speeds(path: &Path) -> CoreResult<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed("machineRunSpeed.csv", e))?;

    let mut speeds = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed("machineRunSpeed.csv row", e))?;
        if record.len() < 2 {
            return Err(CoreError::InputMalformed(
                "machineRunSpeed.csv row must have 2 columns".into(),
            ));
        }
        let speed: f64 = record[1].parse().map_err(|e| malformed("run speed", e))?;
        speeds.push(speed);
    }
    Ok(speeds)
}

fn read_setup_matrix(path: &Path, num_ops: usize) -> CoreResult<Vec<Vec<i64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed("sequenceDependencyMatrix.csv", e))?;

    let mut rows = Vec::with_capacity(num_ops);
    for record in reader.records() {
        let record = record.map_err(|e| malformed("sequenceDependencyMatrix.csv row", e))?;
        let mut row = Vec::with_capacity(num_ops);
        for field in record.iter().skip(1) {
            row.push(
                field
                    .parse::<i64>()
                    .map_err(|e| malformed("setup time", e))?,
            );
        }
        rows.push(row);
    }
    if rows.len() != num_ops {
        return Err(CoreError::InputMalformed(format!(
            "sequenceDependencyMatrix.csv has {} data rows, expected {num_ops}",
            rows.len()
        )));
    }
    Ok(rows)
}

/// Reads the three-file CSV intake format and builds an [`Instance`].
pub fn read_csv_triple(
    job_tasks_path: impl AsRef<Path>,
    machine_speeds_path: impl AsRef<Path>,
    seq_dep_matrix_path: impl AsRef<Path>,
) -> CoreResult<Instance> {
    let task_rows = read_job_tasks(job_tasks_path.as_ref())?;
    let machine_speeds = read_machine_speeds(machine_speeds_path.as_ref())?;
    let num_machines = machine_speeds.len();
    let num_ops = task_rows.len();
    let setup = read_setup_matrix(seq_dep_matrix_path.as_ref(), num_ops)?;

    let num_jobs = task_rows
        .iter()
        .map(|r| r.job)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);
    let mut tasks_per_job = vec![0usize; num_jobs];
    for row in &task_rows {
        tasks_per_job[row.job] = tasks_per_job[row.job].max(row.task + 1);
    }
    let jobs: Vec<Vec<usize>> = tasks_per_job.into_iter().map(|n| vec![0usize; n]).collect();

    let mut usable = vec![vec![false; num_machines]; num_ops];
    let mut proc_time = vec![vec![0.0f64; num_machines]; num_ops];
    for (idx, row) in task_rows.iter().enumerate() {
        for &m in &row.usable_machines {
            if m >= num_machines {
                return Err(CoreError::InputMalformed(format!(
                    "task ({}, {}) references unknown machine {m}",
                    row.job, row.task
                )));
            }
            let speed = machine_speeds[m];
            if speed <= 0.0 {
                return Err(CoreError::InputMalformed(format!(
                    "machine {m} has non-positive run speed"
                )));
            }
            usable[idx][m] = true;
            proc_time[idx][m] = row.pieces / speed;
        }
    }

    Instance::new(jobs, num_machines, usable, proc_time, setup)
}
