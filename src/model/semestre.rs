#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::{BTreeSet, HashMap};

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::{
    ids::{EvaluationId, ModuleImplId, SemestreId, StudentId, UeId},
    note::Note,
};

/// A student enrolled in a semester.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct Student {
    /// Unique student id.
    pub id:         StudentId,
    /// Civility prefix ("M.", "Mme", ...), possibly empty.
    #[builder(default)]
    pub civility:   String,
    /// Family name.
    pub last_name:  String,
    /// Given name.
    #[builder(default)]
    pub first_name: String,
}

impl Student {
    /// Key used for alphabetical ordering of the cohort.
    pub fn sort_key(&self) -> String {
        format!("{}{}", self.last_name.to_uppercase(), self.first_name.to_uppercase())
    }

    /// Short display name for recap tables: "DUPONT Pi.".
    pub fn short_name(&self) -> String {
        let initials: String = self.first_name.chars().take(2).collect();
        if initials.is_empty() {
            self.last_name.to_uppercase()
        } else {
            format!("{} {}.", self.last_name.to_uppercase(), initials)
        }
    }

    /// Full display name for bulletins: "M. Pierre DUPONT".
    pub fn full_name(&self) -> String {
        [self.civility.as_str(), self.first_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .chain(std::iter::once(self.last_name.to_uppercase()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Kind of an evaluation, which decides how its grades enter the module
/// average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// Ordinary evaluation, aggregated by coefficient.
    #[default]
    Normal,
    /// Catch-up: the best of the ordinary average and the catch-up grade
    /// stands.
    Rattrapage,
    /// Second session: the grade replaces the ordinary average outright.
    Session2,
}

/// A graded event inside a module: one column of the notes table.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct Evaluation {
    /// Unique evaluation id.
    pub id:                 EvaluationId,
    /// Free-form description shown on bulletins.
    #[builder(default)]
    pub description:        String,
    /// ISO date of the evaluation, used for ordering.
    #[builder(default)]
    pub date:               String,
    /// Weight of this evaluation in the module average.
    pub coefficient:        f64,
    /// Maximum grade; recorded values are rescaled to /20. An evaluation
    /// with a non-positive maximum is ignored.
    #[builder(default = 20.0)]
    pub out_of:             f64,
    /// Ordinary, catch-up, or second-session.
    #[builder(default)]
    pub kind:               EvaluationKind,
    /// Take the evaluation into account even when grades are missing.
    #[builder(default)]
    pub publish_incomplete: bool,
    /// Recorded grades, keyed by student.
    #[builder(default)]
    pub notes:              HashMap<StudentId, Note>,
}

impl Evaluation {
    /// Returns the recorded note for a student, if any was entered.
    pub fn note_for(&self, student: StudentId) -> Option<Note> {
        self.notes.get(&student).copied()
    }

    /// Records (or overwrites) a student's note.
    pub fn set_note(&mut self, student: StudentId, note: Note) {
        self.notes.insert(student, note);
    }
}

/// A module implemented within a semester; aggregates evaluations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct ModuleImpl {
    /// Unique module-impl id.
    pub id:          ModuleImplId,
    /// Teaching unit this module belongs to.
    pub ue_id:       UeId,
    /// Short module code ("TSM1").
    pub code:        String,
    /// Module title.
    #[builder(default)]
    pub title:       String,
    /// Weight of the module in UE and semester averages.
    pub coefficient: f64,
    /// Evaluations, oldest first once sorted by date.
    #[builder(default)]
    pub evaluations: Vec<Evaluation>,
    /// Students enrolled in this module. Empty means every student
    /// enrolled in the semester.
    #[builder(default)]
    pub enrolled:    BTreeSet<StudentId>,
}

impl ModuleImpl {
    /// Evaluations sorted oldest first (date, then id).
    pub fn evaluations_ordered(&self) -> Vec<&Evaluation> {
        let mut evals: Vec<&Evaluation> = self.evaluations.iter().collect();
        evals.sort_by(|a, b| (a.date.as_str(), a.id).cmp(&(b.date.as_str(), b.id)));
        evals
    }

    /// Mutable access to an evaluation by id.
    pub fn evaluation_mut(&mut self, id: EvaluationId) -> Option<&mut Evaluation> {
        self.evaluations.iter_mut().find(|e| e.id == id)
    }
}

/// A teaching unit (UE): a graded grouping of modules.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct Ue {
    /// Unique UE id.
    pub id:          UeId,
    /// Short acronym ("TST1").
    pub acronym:     String,
    /// UE title.
    #[builder(default)]
    pub title:       String,
    /// Ordering number within the semester.
    #[builder(default)]
    pub number:      u32,
    /// Declared coefficient, used instead of the module coefficient sum
    /// when the `use_ue_coefs` option is set.
    pub coefficient: Option<f64>,
}

/// A semester of a formation: UEs, modules and the enrolled cohort.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct FormSemestre {
    /// Unique semester id.
    pub id:           SemestreId,
    /// Semester title.
    #[builder(default)]
    pub title:        String,
    /// Teaching units, ordered by `number`.
    #[builder(default)]
    pub ues:          Vec<Ue>,
    /// Module implementations.
    #[builder(default)]
    pub modules:      Vec<ModuleImpl>,
    /// Enrolled students.
    #[builder(default)]
    pub inscriptions: Vec<Student>,
}

impl FormSemestre {
    /// UEs ordered by number then id.
    pub fn ues_ordered(&self) -> Vec<&Ue> {
        let mut ues: Vec<&Ue> = self.ues.iter().collect();
        ues.sort_by_key(|ue| (ue.number, ue.id));
        ues
    }

    /// Modules of one UE, ordered by code then id.
    pub fn modules_of_ue(&self, ue_id: UeId) -> Vec<&ModuleImpl> {
        let mut modules: Vec<&ModuleImpl> =
            self.modules.iter().filter(|m| m.ue_id == ue_id).collect();
        modules.sort_by(|a, b| (a.code.as_str(), a.id).cmp(&(b.code.as_str(), b.id)));
        modules
    }

    /// Modules in UE order, the column order of the notes table.
    pub fn modules_ordered(&self) -> Vec<&ModuleImpl> {
        self.ues_ordered()
            .into_iter()
            .flat_map(|ue| self.modules_of_ue(ue.id))
            .collect()
    }

    /// Looks up a UE by id.
    pub fn ue(&self, id: UeId) -> Option<&Ue> {
        self.ues.iter().find(|ue| ue.id == id)
    }

    /// Looks up a module by id.
    pub fn module(&self, id: ModuleImplId) -> Option<&ModuleImpl> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Mutable access to a module by id.
    pub fn module_mut(&mut self, id: ModuleImplId) -> Option<&mut ModuleImpl> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    /// Looks up a student by id.
    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.inscriptions.iter().find(|s| s.id == id)
    }

    /// Ids of every student enrolled in the semester.
    pub fn student_ids(&self) -> BTreeSet<StudentId> {
        self.inscriptions.iter().map(|s| s.id).collect()
    }

    /// Cohort in alphabetical order.
    pub fn students_sorted(&self) -> Vec<&Student> {
        let mut students: Vec<&Student> = self.inscriptions.iter().collect();
        students.sort_by_key(|s| (s.sort_key(), s.id));
        students
    }

    /// Students counted in a module: the intersection of semester and
    /// module enrollments (an empty module roster means everyone).
    pub fn module_roster(&self, module: &ModuleImpl) -> BTreeSet<StudentId> {
        let sem = self.student_ids();
        if module.enrolled.is_empty() {
            sem
        } else {
            sem.intersection(&module.enrolled).copied().collect()
        }
    }

    /// Ids of every evaluation in the semester, used for cache eviction.
    pub fn evaluation_ids(&self) -> Vec<EvaluationId> {
        self.modules
            .iter()
            .flat_map(|m| m.evaluations.iter().map(|e| e.id))
            .collect()
    }

    /// Finds an evaluation anywhere in the semester.
    pub fn evaluation(&self, id: EvaluationId) -> Option<(&ModuleImpl, &Evaluation)> {
        self.modules.iter().find_map(|m| {
            m.evaluations
                .iter()
                .find(|e| e.id == id)
                .map(|e| (m, e))
        })
    }

    /// Mutable access to an evaluation anywhere in the semester.
    pub fn evaluation_mut(&mut self, id: EvaluationId) -> Option<&mut Evaluation> {
        self.modules
            .iter_mut()
            .find_map(|m| m.evaluation_mut(id))
    }

    /// True when no module holds any evaluation.
    pub fn has_no_evaluations(&self) -> bool {
        self.modules.iter().all(|m| m.evaluations.is_empty())
    }
}
