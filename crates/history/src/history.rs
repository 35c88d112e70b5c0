//! Run History: a job's number-ordered builds
//!
//! ## Design
//!
//! The history is a `BTreeMap` keyed by build number behind a read-mostly
//! lock. Builds may finish in any order; neighbours are always determined by
//! number. Build #2 can still be running after #3 has finished.
//!
//! Queries do not walk the live map. They take a [`HistorySnapshot`] (the
//! ordered records plus each record's completion state at that instant)
//! and run as pure functions over it. A caller that needs fresher data takes
//! a new snapshot.

use crate::record::RunRecord;
use crate::snapshot::{HistorySnapshot, RunEntry};
use parking_lot::RwLock;
use runkeep_core::{BuildNumber, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds of one job, ordered by number
#[derive(Debug, Default)]
pub struct RunHistory {
    runs: RwLock<BTreeMap<BuildNumber, Arc<RunRecord>>>,
}

impl RunHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    ///
    /// The number must be strictly greater than every number already
    /// present; anything else would corrupt neighbour relations and is
    /// refused.
    pub fn insert(&self, run: Arc<RunRecord>) -> Result<()> {
        let mut runs = self.runs.write();
        self.insert_locked(&mut runs, run)
    }

    /// Append a record built from the next number, atomically
    ///
    /// `make` receives the number to use; the write lock is held across
    /// the call so no other insert can take the same number. `admit` runs
    /// first under the same lock and may refuse the insert.
    pub fn insert_next<A, F>(&self, floor: BuildNumber, admit: A, make: F) -> Result<Arc<RunRecord>>
    where
        A: FnOnce(&BTreeMap<BuildNumber, Arc<RunRecord>>) -> Result<()>,
        F: FnOnce(BuildNumber) -> Result<RunRecord>,
    {
        let mut runs = self.runs.write();
        admit(&runs)?;
        let next = runs
            .keys()
            .next_back()
            .map(|n| n.next())
            .unwrap_or(BuildNumber::FIRST)
            .max(floor);
        let run = Arc::new(make(next)?);
        if run.number() != next {
            return Err(Error::Internal(format!(
                "record built as #{} but #{} was reserved",
                run.number(),
                next
            )));
        }
        self.insert_locked(&mut runs, Arc::clone(&run))?;
        Ok(run)
    }

    fn insert_locked(
        &self,
        runs: &mut BTreeMap<BuildNumber, Arc<RunRecord>>,
        run: Arc<RunRecord>,
    ) -> Result<()> {
        if run.number().get() == 0 {
            return Err(Error::consistency("build numbers start at 1"));
        }
        if let Some(last) = runs.keys().next_back() {
            if run.number() <= *last {
                return Err(Error::consistency(format!(
                    "build #{} is not after the latest build #{}",
                    run.number(),
                    last
                )));
            }
        }
        runs.insert(run.number(), run);
        Ok(())
    }

    /// Look up a build by number
    pub fn get(&self, number: BuildNumber) -> Option<Arc<RunRecord>> {
        self.runs.read().get(&number).cloned()
    }

    /// Remove a build; surviving builds keep their numbers
    pub fn remove(&self, number: BuildNumber) -> Option<Arc<RunRecord>> {
        self.runs.write().remove(&number)
    }

    /// Number of retained builds
    pub fn len(&self) -> usize {
        self.runs.read().len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.runs.read().is_empty()
    }

    /// Oldest retained build
    pub fn first(&self) -> Option<Arc<RunRecord>> {
        self.runs.read().values().next().cloned()
    }

    /// Newest build
    pub fn last(&self) -> Option<Arc<RunRecord>> {
        self.runs.read().values().next_back().cloned()
    }

    /// Newest build that has a result
    pub fn last_completed(&self) -> Option<Arc<RunRecord>> {
        self.runs
            .read()
            .values()
            .rev()
            .find(|r| !r.is_building())
            .cloned()
    }

    /// Builds still running, oldest first
    pub fn building(&self) -> Vec<Arc<RunRecord>> {
        self.runs
            .read()
            .values()
            .filter(|r| r.is_building())
            .cloned()
            .collect()
    }

    /// Retained numbers, ascending
    pub fn numbers(&self) -> Vec<BuildNumber> {
        self.runs.read().keys().copied().collect()
    }

    /// Build immediately before `number`
    pub fn previous_of(&self, number: BuildNumber) -> Option<Arc<RunRecord>> {
        self.runs
            .read()
            .range(..number)
            .next_back()
            .map(|(_, r)| Arc::clone(r))
    }

    /// Build immediately after `number`
    pub fn next_of(&self, number: BuildNumber) -> Option<Arc<RunRecord>> {
        self.runs
            .read()
            .range(number.next()..)
            .next()
            .map(|(_, r)| Arc::clone(r))
    }

    /// Consistent snapshot of the ordered builds and their completion state
    pub fn snapshot(&self) -> HistorySnapshot {
        let runs = self.runs.read();
        HistorySnapshot::new(runs.values().map(|r| RunEntry::capture(Arc::clone(r))).collect())
    }
}
