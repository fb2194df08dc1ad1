//! Error taxonomy for instance construction and search execution.
//!
//! Runtime-recoverable conditions (malformed input, an infeasible instance,
//! a bad seed) are [`CoreError`] variants. Conditions that indicate a bug in
//! this crate rather than bad input — an invariant a `Solution` should never
//! be able to violate — are not represented here; they `panic!` at the point
//! of discovery and are caught at the worker-join boundary in the
//! coordinator instead of threaded through `Result`.

use thiserror::Error;

/// Errors surfaced by instance intake and search configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input file is structurally invalid: wrong column count, a
    /// reference to a job/task/machine that doesn't exist, a non-numeric
    /// field, or similar.
    #[error("malformed input: {0}")]
    InputMalformed(String),

    /// The instance is well-formed but admits no feasible solution, e.g. an
    /// operation with an empty usable-machine set.
    #[error("infeasible instance: {0}")]
    InfeasibleInstance(String),

    /// A caller-supplied seed or worker count is out of range (zero workers,
    /// a tabu tenure of zero, etc).
    #[error("invalid seed or configuration: {0}")]
    InvalidSeed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
