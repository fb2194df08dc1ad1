//! A metaheuristic search core for the flexible job-shop scheduling problem
//! with sequence-dependent setup times (SDST-FJSP): a compact `Solution`
//! representation, an O(n·m) makespan evaluator, a neighbor generator, a
//! parallel Tabu Search, and a Genetic Algorithm.
//!
//! # Modules
//!
//! - **`instance`**: the immutable problem definition — jobs, usable
//!   machines, processing times, sequence-dependent setup times.
//! - **`solution`**: the operation-order encoding, feasibility invariants,
//!   and makespan caching.
//! - **`evaluator`**: the forward-simulation makespan computation.
//! - **`neighbor`**: single-move perturbations and timed neighborhood
//!   expansion.
//! - **`tabu`**: a single Tabu Search worker.
//! - **`ga`**: the Genetic Algorithm engine.
//! - **`coordinator`**: parallel Tabu Search workers and GA runs, seeded and
//!   reduced to a single best result.
//! - **`intake`**: the CSV-triple and `.fjs` wire formats, and the
//!   `fjs_to_csv` conversion utility.
//! - **`report`**: a decode-only view of an evaluated solution for external
//!   presentation layers.
//! - **`error`**: the `CoreError` taxonomy.
//!
//! Report rendering, spreadsheet export, progress bars, and CLI/config
//! plumbing are external collaborators, not part of this crate.

pub mod coordinator;
pub mod error;
pub mod evaluator;
pub mod ga;
pub mod instance;
pub mod intake;
pub mod neighbor;
pub mod report;
pub mod solution;
pub mod tabu;

pub use error::{CoreError, CoreResult};
pub use instance::Instance;
pub use solution::{OpRow, Solution};
