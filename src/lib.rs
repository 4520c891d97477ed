//! # scolar
//!
//! The grading engine of a student academic-records system: weighted
//! averages from evaluations up to the semester, catch-up ("rattrapage")
//! substitution, ex-aequo ranks, cached notes tables, and bulletins.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Bottom-up aggregation: module and UE averages, the notes table,
/// ranks, bulletins.
pub mod aggregate;
/// Semester-keyed memoization of computed tables and grade maps.
pub mod cache;
/// Dataset loading.
pub mod io;
/// Entities the engine aggregates: students, evaluations, modules, UEs,
/// semesters.
pub mod model;

pub use aggregate::{AggregateError, Bulletin, NotesTable, Options};
pub use cache::NotesCache;
pub use io::Dataset;
