mod support;

use scolar::{
    AggregateError, Bulletin, NotesTable, Options,
    model::{EvaluationKind, Note, StudentId},
};
use support::Fake;

/// The rattrapage scenario: one student, one UE, one module, one ordinary
/// and one catch-up evaluation.
fn rattrapage_fixture() -> (Fake, StudentId) {
    let mut fake = Fake::new(1);
    let student = fake.student("DUPONT", "Pierre");
    let ue = fake.ue("TST1");
    let module = fake.module(ue, "TSM1", 1.0);
    let e = fake.evaluation(module, "2020-01-01", 1.0);
    let rat = fake.catch_up(module, "2020-01-02", 1.0, EvaluationKind::Rattrapage);
    fake.grade(e, student, 12.0);
    fake.grade(rat, student, 11.0);
    (fake, student)
}

#[test]
fn bulletin_structure_lists_ues_modules_and_evaluations() {
    let (fake, student) = rattrapage_fixture();
    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let bulletin = Bulletin::build(fake.semestre(), &table, student).expect("bulletin");

    assert_eq!(bulletin.student_id, student);
    assert_eq!(bulletin.ues.len(), 1);
    assert_eq!(bulletin.ues[0].modules.len(), 1);
    assert_eq!(bulletin.ues[0].modules[0].evaluations.len(), 2);
    // the catch-up (11) is below the ordinary grade: the average stays 12
    assert_eq!(bulletin.ues[0].modules[0].average, "12.00");
}

#[test]
fn bulletin_average_follows_the_catch_up_substitution() {
    let (mut fake, student) = rattrapage_fixture();
    let sem_rat = fake.semestre().evaluation_ids()[1];
    fake.grade(sem_rat, student, 18.0);

    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let bulletin = Bulletin::build(fake.semestre(), &table, student).expect("bulletin");
    assert_eq!(bulletin.ues[0].modules[0].average, "18.00");
    assert_eq!(bulletin.general, "18.00");
}

#[test]
fn bulletin_carries_rank_and_cohort() {
    let (mut fake, student) = rattrapage_fixture();
    let other = fake.student("MARTIN", "Alice");
    let e = fake.semestre().evaluation_ids()[0];
    let rat = fake.semestre().evaluation_ids()[1];
    fake.grade(e, other, 15.0);
    fake.note(rat, other, Note::Absent);

    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let bulletin = Bulletin::build(fake.semestre(), &table, student).expect("bulletin");
    assert_eq!(bulletin.cohort, 2);
    assert_eq!(bulletin.rank, "2");
    assert_eq!(bulletin.ues[0].rank, "2");
    assert_eq!(bulletin.ues[0].ranked, 2);
}

#[test]
fn bulletin_formats_absences_on_evaluation_lines() {
    let mut fake = Fake::new(1);
    let student = fake.student("DUPONT", "Pierre");
    let other = fake.student("MARTIN", "Alice");
    let ue = fake.ue("TST1");
    let module = fake.module(ue, "TSM1", 1.0);
    let e = fake.evaluation(module, "2020-01-01", 1.0);
    fake.note(e, student, Note::Absent);
    fake.grade(e, other, 13.0);

    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let bulletin = Bulletin::build(fake.semestre(), &table, student).expect("bulletin");
    let line = &bulletin.ues[0].modules[0].evaluations[0];
    assert_eq!(line.note, "ABS");
    assert_eq!(line.class_mean, "13.00");
    assert_eq!(bulletin.ues[0].modules[0].average, "-");
}

#[test]
fn bulletin_skips_ues_without_enrollment() {
    let mut fake = Fake::new(1);
    let student = fake.student("DUPONT", "Pierre");
    let ue1 = fake.ue("UE1");
    let ue2 = fake.ue("UE2");
    let m1 = fake.module(ue1, "M1", 1.0);
    let m2 = fake.module(ue2, "M2", 1.0);
    let e1 = fake.evaluation(m1, "2020-01-01", 1.0);
    fake.evaluation(m2, "2020-01-02", 1.0);
    fake.grade(e1, student, 10.0);

    // the student is only enrolled in m1
    let mut sem = fake.into_semestre();
    sem.module_mut(m2).unwrap().enrolled.insert(StudentId(99));

    let table = NotesTable::compute(&sem, &Options::default()).expect("table");
    let bulletin = Bulletin::build(&sem, &table, student).expect("bulletin");
    assert_eq!(bulletin.ues.len(), 1);
    assert_eq!(bulletin.ues[0].acronym, "UE1");
}

#[test]
fn unknown_student_is_a_domain_error() {
    let (fake, _) = rattrapage_fixture();
    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let err = Bulletin::build(fake.semestre(), &table, StudentId(999)).unwrap_err();
    assert!(matches!(err, AggregateError::UnknownStudent { .. }));
}

#[test]
fn bulletin_serializes_to_json() {
    let (fake, student) = rattrapage_fixture();
    let table = NotesTable::compute(fake.semestre(), &Options::default()).expect("table");
    let bulletin = Bulletin::build(fake.semestre(), &table, student).expect("bulletin");

    let json = serde_json::to_value(&bulletin).expect("serialize");
    assert_eq!(json["ues"][0]["modules"][0]["average"], "12.00");
    assert_eq!(json["cohort"], 1);
}
