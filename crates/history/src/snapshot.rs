//! Immutable view of a job's history
//!
//! A snapshot pins both the set of builds and each build's completion
//! state at the moment it was taken. A build that completes afterwards still
//! reads as building through an older snapshot.

use crate::record::RunRecord;
use runkeep_core::{BuildNumber, Outcome};
use std::sync::Arc;

/// A build as seen by one snapshot
#[derive(Debug, Clone)]
pub struct RunEntry {
    run: Arc<RunRecord>,
    result: Option<Outcome>,
}

impl RunEntry {
    /// Capture the record's current completion state
    pub fn capture(run: Arc<RunRecord>) -> Self {
        let result = run.result();
        RunEntry { run, result }
    }

    /// Build number
    pub fn number(&self) -> BuildNumber {
        self.run.number()
    }

    /// Result at capture time
    pub fn result(&self) -> Option<Outcome> {
        self.result
    }

    /// Building at capture time
    pub fn is_building(&self) -> bool {
        self.result.is_none()
    }

    /// The live record
    pub fn run(&self) -> &Arc<RunRecord> {
        &self.run
    }
}

/// Builds of one job, ascending by number, frozen at one instant
#[derive(Debug, Clone, Default)]
pub struct HistorySnapshot {
    entries: Vec<RunEntry>,
}

impl HistorySnapshot {
    /// Wrap entries that are already sorted by number
    pub(crate) fn new(entries: Vec<RunEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].number() < w[1].number()));
        HistorySnapshot { entries }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// Number of builds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no builds
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `number`
    pub fn get(&self, number: BuildNumber) -> Option<&RunEntry> {
        self.entries
            .binary_search_by_key(&number, RunEntry::number)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Newest entry
    pub fn last(&self) -> Option<&RunEntry> {
        self.entries.last()
    }

    /// Newest completed entry
    pub fn last_completed(&self) -> Option<&RunEntry> {
        self.entries.iter().rev().find(|e| !e.is_building())
    }

    /// Entries with a number below `number`, newest first
    ///
    /// `number` itself does not have to be in the snapshot.
    pub fn before(&self, number: BuildNumber) -> impl Iterator<Item = &RunEntry> + '_ {
        let end = self.entries.partition_point(|e| e.number() < number);
        self.entries[..end].iter().rev()
    }

    /// Entries with a number at or below `number`, newest first
    pub fn from_down(&self, number: BuildNumber) -> impl Iterator<Item = &RunEntry> + '_ {
        let end = self.entries.partition_point(|e| e.number() <= number);
        self.entries[..end].iter().rev()
    }
}
