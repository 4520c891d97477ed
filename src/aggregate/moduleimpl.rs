#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::{Avg, Diagnostic};
use crate::model::{
    Evaluation, EvaluationId, EvaluationKind, FormSemestre, ModuleImpl, Note, StudentId,
};

/// Tallies describing how complete one evaluation is.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationState {
    /// Evaluation this state describes.
    pub evaluation_id: EvaluationId,
    /// Students counted in the module.
    pub enrolled:      usize,
    /// Numeric grades entered.
    pub graded:        usize,
    /// Recorded absences.
    pub absences:      usize,
    /// Neutralized (excused) grades.
    pub neutralized:   usize,
    /// Grades still awaited.
    pub pending:       usize,
    /// True when every enrolled student has an entry.
    pub complete:      bool,
}

impl EvaluationState {
    /// Tallies one evaluation against the module roster.
    pub fn of(evaluation: &Evaluation, roster: &BTreeSet<StudentId>) -> Self {
        let mut graded = 0;
        let mut absences = 0;
        let mut neutralized = 0;
        let mut pending = 0;
        let mut entries = 0;
        for student in roster {
            match evaluation.note_for(*student) {
                Some(Note::Value(_)) => {
                    graded += 1;
                    entries += 1;
                }
                Some(Note::Absent) => {
                    absences += 1;
                    entries += 1;
                }
                Some(Note::Neutralized) => {
                    neutralized += 1;
                    entries += 1;
                }
                Some(Note::Pending) => {
                    pending += 1;
                    entries += 1;
                }
                None => {}
            }
        }
        Self {
            evaluation_id: evaluation.id,
            enrolled: roster.len(),
            graded,
            absences,
            neutralized,
            pending,
            complete: entries == roster.len(),
        }
    }

    /// An evaluation enters averages only when gradable and either
    /// complete, awaiting grades, or explicitly published incomplete.
    pub fn is_valid(&self, evaluation: &Evaluation) -> bool {
        evaluation.out_of > 0.0
            && (self.complete || self.pending > 0 || evaluation.publish_incomplete)
    }
}

/// Per-student module averages plus the bookkeeping the table and
/// bulletins need.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleAverages {
    /// Average per enrolled student; students outside the roster have no
    /// entry.
    pub per_student: HashMap<StudentId, Avg>,
    /// Evaluations that entered the computation, oldest first.
    pub valid_evaluations: Vec<EvaluationId>,
    /// States of every evaluation of the module.
    pub states: HashMap<EvaluationId, EvaluationState>,
    /// True when any counted evaluation still awaits grades.
    pub pending: bool,
    /// Findings such as duplicate catch-up evaluations.
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleAverages {
    /// Average slot for one student ([`Avg::NotEnrolled`] outside the
    /// roster).
    pub fn average_for(&self, student: StudentId) -> Avg {
        self.per_student
            .get(&student)
            .copied()
            .unwrap_or(Avg::NotEnrolled)
    }
}

/// Computes the per-student averages of one module.
///
/// The weighted mean runs over valid ordinary evaluations, grades rescaled
/// to /20; absences and neutralized or pending grades are excluded from
/// both sums. A catch-up grade then substitutes per its kind: best-of for
/// `Rattrapage`, outright replacement for `Session2`, and either one stands
/// alone when the ordinary average is missing.
pub fn compute_module_averages(semestre: &FormSemestre, module: &ModuleImpl) -> ModuleAverages {
    let roster = semestre.module_roster(module);
    let ordered = module.evaluations_ordered();

    let mut states = HashMap::new();
    let mut valid_evaluations = Vec::new();
    let mut pending = false;
    let mut diagnostics = Vec::new();
    let mut catch_up: Option<&Evaluation> = None;

    for &evaluation in &ordered {
        let state = EvaluationState::of(evaluation, &roster);
        let valid = state.is_valid(evaluation);
        if valid {
            valid_evaluations.push(evaluation.id);
            if state.pending > 0 {
                pending = true;
            }
        }
        states.insert(evaluation.id, state);

        if evaluation.kind != EvaluationKind::Normal {
            if catch_up.is_some() {
                diagnostics.push(Diagnostic {
                    module_id: module.id,
                    message:   format!(
                        "module {} has several catch-up evaluations; keeping the most recent",
                        module.code
                    ),
                });
            }
            // the most recent catch-up wins
            catch_up = Some(evaluation);
        }
    }

    let valid_set: BTreeSet<EvaluationId> = valid_evaluations.iter().copied().collect();

    let mut per_student = HashMap::new();
    for student in &roster {
        let mut sum_notes = 0.0;
        let mut sum_coefs = 0.0;
        for &evaluation in &ordered {
            if evaluation.kind != EvaluationKind::Normal
                || !valid_set.contains(&evaluation.id)
            {
                continue;
            }
            if let Some(scaled) = evaluation
                .note_for(*student)
                .and_then(|note| note.scaled(evaluation.out_of))
            {
                sum_notes += scaled * evaluation.coefficient;
                sum_coefs += evaluation.coefficient;
            }
        }
        let mut average = if sum_coefs > 0.0 {
            Avg::Value(sum_notes / sum_coefs)
        } else {
            Avg::Missing
        };

        if let Some(rattr) = catch_up
            && rattr.out_of > 0.0
            && let Some(scaled) = rattr
                .note_for(*student)
                .and_then(|note| note.scaled(rattr.out_of))
        {
            average = match (average, rattr.kind) {
                (Avg::Value(ordinary), EvaluationKind::Rattrapage) => {
                    Avg::Value(ordinary.max(scaled))
                }
                _ => Avg::Value(scaled),
            };
        }

        per_student.insert(*student, average);
    }

    ModuleAverages {
        per_student,
        valid_evaluations,
        states,
        pending,
        diagnostics,
    }
}
