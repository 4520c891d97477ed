#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Memoization of computed notes tables and per-evaluation grade maps.
//!
//! The engine is single-request and synchronous; the maps sit behind one
//! mutex and concurrent writers follow last-writer-wins.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex},
    time::Instant,
};

use tracing::{debug, info};

use crate::{
    aggregate::{AggregateError, NotesTable, Options},
    model::{EvaluationId, FormSemestre, Note, SemestreId, StudentId},
};

/// A computed table together with the options it was computed under.
struct CachedTable {
    /// Options passed to [`NotesTable::compute`] for this entry.
    options: Options,
    /// The computed table.
    table:   Arc<NotesTable>,
}

/// Everything the cache remembers, behind one lock.
#[derive(Default)]
struct Inner {
    /// Computed tables, keyed by semester.
    tables:      HashMap<SemestreId, CachedTable>,
    /// Per-evaluation grade maps, keyed by evaluation.
    evaluations: HashMap<EvaluationId, Arc<HashMap<StudentId, Note>>>,
    /// Evaluation ids recorded per semester, so invalidation can evict
    /// them without reloading the semester.
    sem_evals:   HashMap<SemestreId, Vec<EvaluationId>>,
    /// While `Some`, invalidations are batched instead of applied.
    deferred:    Option<BTreeSet<SemestreId>>,
    /// Open [`DeferredInvalidation`] scopes; only the outermost flushes.
    defer_depth: usize,
}

/// Cache for [`NotesTable`]s and evaluation grade maps.
#[derive(Default)]
pub struct NotesCache {
    /// Guarded cache state.
    inner: Mutex<Inner>,
}

impl NotesCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for a semester.
    ///
    /// A hit requires the cached entry to have been computed under the
    /// same `options`; a table cached under different options counts as
    /// a miss and is replaced on recompute. On a miss: when `compute`
    /// is true the table is built, stored (together with the semester's
    /// evaluation grade maps) and returned; otherwise the miss is silent
    /// and `None` comes back.
    pub fn table(
        &self,
        semestre: &FormSemestre,
        options: &Options,
        compute: bool,
    ) -> Result<Option<Arc<NotesTable>>, AggregateError> {
        {
            let inner = self.inner.lock().expect("notes cache poisoned");
            if let Some(cached) = inner.tables.get(&semestre.id) {
                if cached.options == *options {
                    debug!(semestre_id = %semestre.id, "notes table cache hit");
                    return Ok(Some(Arc::clone(&cached.table)));
                }
                debug!(
                    semestre_id = %semestre.id,
                    "cached table was computed under different options"
                );
            }
        }
        if !compute {
            return Ok(None);
        }

        let started = Instant::now();
        let table = Arc::new(NotesTable::compute(semestre, options)?);

        let mut inner = self.inner.lock().expect("notes cache poisoned");
        inner.tables.insert(semestre.id, CachedTable {
            options: options.clone(),
            table:   Arc::clone(&table),
        });
        let mut eval_ids = Vec::new();
        for module in &semestre.modules {
            for evaluation in &module.evaluations {
                eval_ids.push(evaluation.id);
                inner
                    .evaluations
                    .insert(evaluation.id, Arc::new(evaluation.notes.clone()));
            }
        }
        inner.sem_evals.insert(semestre.id, eval_ids);
        info!(
            semestre_id = %semestre.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cached notes table"
        );
        Ok(Some(table))
    }

    /// Returns the cached grade map of one evaluation, if present.
    pub fn evaluation_notes(
        &self,
        evaluation: EvaluationId,
    ) -> Option<Arc<HashMap<StudentId, Note>>> {
        self.inner
            .lock()
            .expect("notes cache poisoned")
            .evaluations
            .get(&evaluation)
            .map(Arc::clone)
    }

    /// Evicts the semester's table and every evaluation entry tied to it.
    ///
    /// Afterwards every non-computing lookup for the semester is absent.
    /// Inside a [`DeferredInvalidation`] scope the eviction is recorded
    /// and applied once at the end.
    pub fn invalidate(&self, semestre_id: SemestreId) {
        let mut inner = self.inner.lock().expect("notes cache poisoned");
        if let Some(pending) = inner.deferred.as_mut() {
            pending.insert(semestre_id);
            return;
        }
        Self::evict(&mut inner, semestre_id);
    }

    /// Removes one semester from all maps. Caller holds the lock.
    fn evict(inner: &mut Inner, semestre_id: SemestreId) {
        inner.tables.remove(&semestre_id);
        if let Some(eval_ids) = inner.sem_evals.remove(&semestre_id) {
            for evaluation in eval_ids {
                inner.evaluations.remove(&evaluation);
            }
        }
        info!(semestre_id = %semestre_id, "invalidated semester cache");
    }

    /// Flushes everything.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("notes cache poisoned");
        inner.tables.clear();
        inner.evaluations.clear();
        inner.sem_evals.clear();
        info!("cleared notes cache");
    }

    /// Opens a scope during which repeated invalidations of the same
    /// semesters are batched and applied once when the guard drops.
    ///
    /// Useful when enrolling students one by one: each enrollment would
    /// otherwise invalidate and recompute the same table. Scopes nest;
    /// the batch is applied when the outermost guard drops.
    pub fn defer_invalidations(&self) -> DeferredInvalidation<'_> {
        let mut inner = self.inner.lock().expect("notes cache poisoned");
        if inner.defer_depth == 0 {
            inner.deferred = Some(BTreeSet::new());
        }
        inner.defer_depth += 1;
        DeferredInvalidation { cache: self }
    }
}

/// Guard batching cache invalidations; applies them on drop.
pub struct DeferredInvalidation<'a> {
    /// Cache the batched invalidations apply to.
    cache: &'a NotesCache,
}

impl Drop for DeferredInvalidation<'_> {
    fn drop(&mut self) {
        let pending = {
            let mut inner = self.cache.inner.lock().expect("notes cache poisoned");
            inner.defer_depth -= 1;
            if inner.defer_depth == 0 {
                inner.deferred.take()
            } else {
                None
            }
        };
        if let Some(pending) = pending {
            for semestre_id in pending {
                self.cache.invalidate(semestre_id);
            }
        }
    }
}
