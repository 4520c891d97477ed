#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Identifier newtypes shared across the crate.
pub mod ids;
/// Grade values, the /20 scale, and display formatting.
pub mod note;
/// Semester structure: students, teaching units, modules, evaluations.
pub mod semestre;

pub use ids::{EvaluationId, ModuleImplId, SemestreId, StudentId, UeId};
pub use note::{NOTES_MAX, Note};
pub use semestre::{Evaluation, EvaluationKind, FormSemestre, ModuleImpl, Student, Ue};
