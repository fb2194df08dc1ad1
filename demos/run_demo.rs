//! Smoke-test binary: loads an instance and runs Tabu Search against it,
//! printing the best makespan found. Not part of the library's API surface —
//! report rendering, spreadsheet export, and CLI flags stay external.

use std::env;
use std::process::ExitCode;

use sdst_fjsp::coordinator::run_tabu_search;
use sdst_fjsp::intake::{read_csv_triple, read_fjs};
use sdst_fjsp::tabu::TabuConfig;

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let instance = match args.len() {
        2 => read_fjs(&args[1]),
        4 => read_csv_triple(&args[1], &args[2], &args[3]),
        _ => {
            eprintln!("usage: run_demo <instance.fjs>");
            eprintln!("   or: run_demo <jobTasks.csv> <machineRunSpeed.csv> <sequenceDependencyMatrix.csv>");
            return ExitCode::FAILURE;
        }
    };

    let instance = match instance {
        Ok(i) => i,
        Err(e) => {
            eprintln!("failed to load instance: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = TabuConfig {
        max_iterations: Some(500),
        ..TabuConfig::default()
    };
    match run_tabu_search(&instance, vec![], 4, 42, &config) {
        Ok(result) => {
            let makespan = result.best.makespan_uncached(&instance);
            println!("best makespan: {makespan}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("search failed: {e}");
            ExitCode::FAILURE
        }
    }
}
