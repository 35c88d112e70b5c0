//! History traversal predicates
//!
//! Each query starts below a build number `r` and walks toward older builds.
//! They differ only in what counts as "history":
//!
//! | Query | Skips | Returns |
//! |-------|-------|---------|
//! | `previous_completed` | building | first completed |
//! | `previous_in_progress` | nothing (looks at `r - 1` only) | it, if building |
//! | `previous_built` | building, `ABORTED` | first other |
//! | `previous_not_failed` | `FAILURE` only | first other (building and `ABORTED` count) |
//! | `previous_failed` | anything but `FAILURE` | first `FAILURE` |
//! | `previous_successful` | anything but `SUCCESS` | first `SUCCESS` |
//! | `previous_over_threshold` | building, worse than threshold | up to `n` matches |
//!
//! All of them are pure functions of the snapshot and `r`.

use crate::snapshot::{HistorySnapshot, RunEntry};
use runkeep_core::{BuildNumber, Outcome};

impl HistorySnapshot {
    /// Build immediately before `r`, whatever its state
    pub fn previous_build(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r).next()
    }

    /// Build immediately after `r`, whatever its state
    pub fn next_build(&self, r: BuildNumber) -> Option<&RunEntry> {
        let start = self.entries().partition_point(|e| e.number() <= r);
        self.entries().get(start)
    }

    /// Newest completed build before `r`
    pub fn previous_completed(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r).find(|e| !e.is_building())
    }

    /// The immediate predecessor of `r`, if it is still building
    pub fn previous_in_progress(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.previous_build(r).filter(|e| e.is_building())
    }

    /// Newest build before `r` that completed and was not aborted
    pub fn previous_built(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r)
            .find(|e| matches!(e.result(), Some(result) if result != Outcome::Aborted))
    }

    /// Newest build before `r` whose result is not `FAILURE`
    ///
    /// Building and aborted builds count as "not failed".
    pub fn previous_not_failed(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r).find(|e| e.result() != Some(Outcome::Failure))
    }

    /// Newest build before `r` whose result is `FAILURE`
    pub fn previous_failed(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r).find(|e| e.result() == Some(Outcome::Failure))
    }

    /// Newest build before `r` whose result is `SUCCESS`
    pub fn previous_successful(&self, r: BuildNumber) -> Option<&RunEntry> {
        self.before(r).find(|e| e.result() == Some(Outcome::Success))
    }

    /// Up to `n` completed builds before `r` whose result is at least `threshold`
    ///
    /// Newest first. Building builds are never included and do not count
    /// toward `n`.
    pub fn previous_over_threshold(
        &self,
        r: BuildNumber,
        n: usize,
        threshold: Outcome,
    ) -> Vec<&RunEntry> {
        self.before(r)
            .filter(|e| matches!(e.result(), Some(result) if result.is_better_or_equal(threshold)))
            .take(n)
            .collect()
    }
}
