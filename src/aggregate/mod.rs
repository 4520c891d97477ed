#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Per-student bulletin assembly.
pub mod bulletin;
/// Module averages and catch-up substitution.
pub mod moduleimpl;
/// Ex-aequo rank computation and row ordering.
pub mod ranks;
/// The notes table: bottom-up aggregation for a whole semester.
pub mod table;

use serde::Serialize;
use thiserror::Error;

use crate::model::{ModuleImplId, SemestreId, StudentId, note::fmt_average};

pub use bulletin::{Bulletin, BulletinEvaluation, BulletinModule, BulletinUe};
pub use moduleimpl::{EvaluationState, ModuleAverages, compute_module_averages};
pub use ranks::{compute_ranks, sort_by_average_desc};
pub use table::{ClassStats, NotesTable, Options, Row, UeStatus};

/// Errors raised while aggregating a semester.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The semester holds no evaluation at all; there is nothing to
    /// aggregate.
    #[error("semester {semestre_id} has no evaluations")]
    NoEvaluations {
        /// Semester that was being aggregated.
        semestre_id: SemestreId,
    },
    /// A bulletin was requested for a student not enrolled in the
    /// semester.
    #[error("student {student_id} is not enrolled in semester {semestre_id}")]
    UnknownStudent {
        /// The unknown student.
        student_id:  StudentId,
        /// Semester the bulletin was requested for.
        semestre_id: SemestreId,
    },
}

/// Non-fatal findings reported alongside a computed table.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Module the finding concerns.
    pub module_id: ModuleImplId,
    /// Human-readable description.
    pub message:   String,
}

/// One computed average slot: a value on /20, nothing gradable, or a
/// student outside the roster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Avg {
    /// Weighted average on /20.
    Value(f64),
    /// Enrolled, but no grade carried weight ("NA").
    Missing,
    /// Not enrolled in the module or UE ("NI").
    NotEnrolled,
}

impl Avg {
    /// Numeric value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Avg::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Display string: formatted value, `"-"`, or `"NI"`.
    pub fn to_display(self) -> String {
        match self {
            Avg::NotEnrolled => "NI".to_string(),
            other => fmt_average(other.value()),
        }
    }
}
