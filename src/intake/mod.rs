//! Instance intake: the two wire formats the core accepts, and the
//! conversion utility between them.
//!
//! Both formats are zero-indexed (job, task, machine ids start at 0) and
//! assume jobs are listed in ascending order, matching the reference
//! parsing semantics this module is grounded on.

pub mod csv;
pub mod fjs;

pub use csv::read_csv_triple;
pub use fjs::{fjs_to_csv, read_fjs};
