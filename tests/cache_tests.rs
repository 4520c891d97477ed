mod support;

use scolar::{NotesCache, Options, aggregate::Avg, model::Note};
use support::Fake;

/// A small two-semester dataset with one grade each.
fn two_semesters() -> (scolar::model::FormSemestre, scolar::model::FormSemestre) {
    let mut first = Fake::new(1);
    let a = first.student("MARTIN", "Alice");
    let ue = first.ue("UE1");
    let module = first.module(ue, "M1", 1.0);
    let e = first.evaluation(module, "2020-01-01", 1.0);
    first.grade(e, a, 12.0);

    let mut second = Fake::new(2);
    let b = second.student("NGUYEN", "Binh");
    let ue = second.ue("UE1");
    let module = second.module(ue, "M1", 1.0);
    let e = second.evaluation(module, "2020-02-01", 1.0);
    second.grade(e, b, 15.0);

    (first.into_semestre(), second.into_semestre())
}

#[test]
fn non_computing_lookup_misses_silently() {
    let (sem, _) = two_semesters();
    let cache = NotesCache::new();
    let hit = cache.table(&sem, &Options::default(), false).expect("no error");
    assert!(hit.is_none());
}

#[test]
fn computing_lookup_fills_the_cache() {
    let (sem, _) = two_semesters();
    let cache = NotesCache::new();

    let computed = cache
        .table(&sem, &Options::default(), true)
        .expect("no error")
        .expect("computed");
    assert_eq!(computed.semestre_id, sem.id);

    // now present without computing
    let cached = cache
        .table(&sem, &Options::default(), false)
        .expect("no error")
        .expect("cached");
    assert_eq!(cached.semestre_id, sem.id);

    // evaluation grade maps were materialized too
    let eval_id = sem.evaluation_ids()[0];
    let notes = cache.evaluation_notes(eval_id).expect("cached notes");
    assert_eq!(notes.len(), 1);
    assert!(matches!(notes.values().next(), Some(Note::Value(v)) if *v == 12.0));
}

#[test]
fn table_cached_under_different_options_is_a_miss() {
    let mut fake = Fake::new(3);
    let student = fake.student("MARTIN", "Alice");
    let ue1 = fake.ue_with_coef("UE1", 1.0);
    let ue2 = fake.ue_with_coef("UE2", 3.0);
    let m1 = fake.module(ue1, "M1", 5.0);
    let m2 = fake.module(ue2, "M2", 1.0);
    for (module, value) in [(m1, 16.0), (m2, 8.0)] {
        let e = fake.evaluation(module, "2020-01-01", 1.0);
        fake.grade(e, student, value);
    }
    let sem = fake.into_semestre();

    let cache = NotesCache::new();
    let by_modules = cache
        .table(&sem, &Options::default(), true)
        .unwrap()
        .unwrap();
    // (16*5 + 8*1) / 6 = 14.6667
    let general = by_modules.general_average(student).value().expect("numeric");
    assert!((general - 88.0 / 6.0).abs() < 1e-9);

    // the default-options entry must not answer for the UE weighting
    let options = Options::builder().use_ue_coefs(true).build();
    assert!(cache.table(&sem, &options, false).unwrap().is_none());
    let by_ues = cache.table(&sem, &options, true).unwrap().unwrap();
    // (16*1 + 8*3) / 4 = 10
    assert_eq!(by_ues.general_average(student), Avg::Value(10.0));

    // the recomputed entry replaced the old one
    let cached = cache.table(&sem, &options, false).unwrap().expect("cached");
    assert_eq!(cached.general_average(student), Avg::Value(10.0));
}

#[test]
fn invalidation_evicts_table_and_evaluations_of_that_semester() {
    let (first, second) = two_semesters();
    let cache = NotesCache::new();
    cache.table(&first, &Options::default(), true).unwrap();
    cache.table(&second, &Options::default(), true).unwrap();

    cache.invalidate(first.id);

    assert!(cache.table(&first, &Options::default(), false).unwrap().is_none());
    for eval_id in first.evaluation_ids() {
        assert!(cache.evaluation_notes(eval_id).is_none());
    }
    // the other semester is untouched
    assert!(cache.table(&second, &Options::default(), false).unwrap().is_some());
    for eval_id in second.evaluation_ids() {
        assert!(cache.evaluation_notes(eval_id).is_some());
    }
}

#[test]
fn clear_flushes_everything() {
    let (first, second) = two_semesters();
    let cache = NotesCache::new();
    cache.table(&first, &Options::default(), true).unwrap();
    cache.table(&second, &Options::default(), true).unwrap();

    cache.clear();

    assert!(cache.table(&first, &Options::default(), false).unwrap().is_none());
    assert!(cache.table(&second, &Options::default(), false).unwrap().is_none());
    assert!(cache.evaluation_notes(first.evaluation_ids()[0]).is_none());
}

#[test]
fn deferred_invalidations_apply_once_the_guard_drops() {
    let (sem, _) = two_semesters();
    let cache = NotesCache::new();
    cache.table(&sem, &Options::default(), true).unwrap();

    {
        let _guard = cache.defer_invalidations();
        cache.invalidate(sem.id);
        cache.invalidate(sem.id);
        // still cached inside the scope
        assert!(cache.table(&sem, &Options::default(), false).unwrap().is_some());
    }

    // applied on drop
    assert!(cache.table(&sem, &Options::default(), false).unwrap().is_none());
}

#[test]
fn nested_deferral_scopes_flush_at_the_outermost_guard_only() {
    let (sem, _) = two_semesters();
    let cache = NotesCache::new();
    cache.table(&sem, &Options::default(), true).unwrap();

    {
        let _outer = cache.defer_invalidations();
        cache.invalidate(sem.id);
        {
            let _inner = cache.defer_invalidations();
            cache.invalidate(sem.id);
        }
        // dropping the inner guard must not apply the batch
        assert!(cache.table(&sem, &Options::default(), false).unwrap().is_some());
    }

    assert!(cache.table(&sem, &Options::default(), false).unwrap().is_none());
}

#[test]
fn recompute_after_invalidation_reflects_new_grades() {
    let (mut sem, _) = two_semesters();
    let cache = NotesCache::new();
    let student = sem.inscriptions[0].id;
    let module = sem.modules[0].id;
    let eval_id = sem.evaluation_ids()[0];

    let before = cache
        .table(&sem, &Options::default(), true)
        .unwrap()
        .unwrap();
    assert_eq!(before.module_average(module, student).value(), Some(12.0));

    sem.evaluation_mut(eval_id).unwrap().set_note(student, Note::Value(17.0));
    cache.invalidate(sem.id);

    let after = cache
        .table(&sem, &Options::default(), true)
        .unwrap()
        .unwrap();
    assert_eq!(after.module_average(module, student).value(), Some(17.0));
}
