#![allow(dead_code)]

//! Fixture generator for the integration tests: builds semesters,
//! students, modules and evaluations with sequential ids.

use scolar::model::{
    Evaluation, EvaluationId, EvaluationKind, FormSemestre, ModuleImpl, ModuleImplId, Note,
    SemestreId, Student, StudentId, Ue, UeId,
};

/// Builds one semester step by step, handing out sequential ids.
pub struct Fake {
    /// Semester under construction.
    sem:  FormSemestre,
    /// Next raw id to hand out.
    next: u32,
}

impl Fake {
    /// Starts an empty semester. Ids are namespaced by semester so that
    /// two fixtures never collide in a shared cache.
    pub fn new(semestre_id: u32) -> Self {
        Self {
            sem:  FormSemestre::builder()
                .id(SemestreId(semestre_id))
                .title("test semester")
                .build(),
            next: semestre_id * 1000 + 1,
        }
    }

    /// Hands out the next raw id.
    fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Enrolls a student.
    pub fn student(&mut self, last_name: &str, first_name: &str) -> StudentId {
        let id = StudentId(self.next_id());
        self.sem.inscriptions.push(
            Student::builder()
                .id(id)
                .last_name(last_name)
                .first_name(first_name)
                .build(),
        );
        id
    }

    /// Adds a teaching unit.
    pub fn ue(&mut self, acronym: &str) -> UeId {
        let id = UeId(self.next_id());
        let number = self.sem.ues.len() as u32;
        self.sem.ues.push(
            Ue::builder()
                .id(id)
                .acronym(acronym)
                .title("ue test")
                .number(number)
                .build(),
        );
        id
    }

    /// Adds a teaching unit with a declared coefficient.
    pub fn ue_with_coef(&mut self, acronym: &str, coefficient: f64) -> UeId {
        let id = self.ue(acronym);
        self.sem
            .ues
            .iter_mut()
            .find(|ue| ue.id == id)
            .unwrap()
            .coefficient = Some(coefficient);
        id
    }

    /// Adds a module to a UE.
    pub fn module(&mut self, ue_id: UeId, code: &str, coefficient: f64) -> ModuleImplId {
        let id = ModuleImplId(self.next_id());
        self.sem.modules.push(
            ModuleImpl::builder()
                .id(id)
                .ue_id(ue_id)
                .code(code)
                .title("module test")
                .coefficient(coefficient)
                .build(),
        );
        id
    }

    /// Adds an ordinary evaluation graded /20.
    pub fn evaluation(&mut self, module: ModuleImplId, date: &str, coefficient: f64) -> EvaluationId {
        self.evaluation_out_of(module, date, coefficient, 20.0)
    }

    /// Adds an ordinary evaluation with a custom maximum.
    pub fn evaluation_out_of(
        &mut self,
        module: ModuleImplId,
        date: &str,
        coefficient: f64,
        out_of: f64,
    ) -> EvaluationId {
        self.push_evaluation(module, date, coefficient, out_of, EvaluationKind::Normal)
    }

    /// Adds a catch-up or second-session evaluation.
    pub fn catch_up(
        &mut self,
        module: ModuleImplId,
        date: &str,
        coefficient: f64,
        kind: EvaluationKind,
    ) -> EvaluationId {
        self.push_evaluation(module, date, coefficient, 20.0, kind)
    }

    /// Adds a catch-up evaluation with a custom maximum.
    pub fn catch_up_out_of(
        &mut self,
        module: ModuleImplId,
        date: &str,
        coefficient: f64,
        out_of: f64,
        kind: EvaluationKind,
    ) -> EvaluationId {
        self.push_evaluation(module, date, coefficient, out_of, kind)
    }

    /// Appends one evaluation to a module.
    fn push_evaluation(
        &mut self,
        module: ModuleImplId,
        date: &str,
        coefficient: f64,
        out_of: f64,
        kind: EvaluationKind,
    ) -> EvaluationId {
        let id = EvaluationId(self.next_id());
        let evaluation = Evaluation::builder()
            .id(id)
            .description("evaluation test")
            .date(date)
            .coefficient(coefficient)
            .out_of(out_of)
            .kind(kind)
            .build();
        self.sem
            .module_mut(module)
            .expect("module exists")
            .evaluations
            .push(evaluation);
        id
    }

    /// Records (or overwrites) a note.
    pub fn note(&mut self, evaluation: EvaluationId, student: StudentId, note: Note) {
        self.sem
            .evaluation_mut(evaluation)
            .expect("evaluation exists")
            .set_note(student, note);
    }

    /// Shorthand for recording a numeric grade.
    pub fn grade(&mut self, evaluation: EvaluationId, student: StudentId, value: f64) {
        self.note(evaluation, student, Note::Value(value));
    }

    /// The semester built so far.
    pub fn semestre(&self) -> &FormSemestre {
        &self.sem
    }

    /// Consumes the builder and returns the semester.
    pub fn into_semestre(self) -> FormSemestre {
        self.sem
    }
}
