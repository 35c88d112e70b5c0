//! Retention Engine
//!
//! Before a build of a job gets going, old artifacts of that job are
//! pruned according to its [`KeepPolicy`]. The walk starts at the most
//! recently completed build and moves toward older builds, tracking the
//! best result seen so far:
//!
//! ```text
//!   #9 SUCCESS   best=NOT_BUILT → SUCCESS     retained
//!   #8 (running)                              skipped
//!   #7 FAILURE   not better than SUCCESS      candidate
//!   #6 SUCCESS   not better than SUCCESS      candidate
//! ```
//!
//! A candidate loses its artifacts (never its record) unless the policy
//! protects it:
//!
//! | Policy | Candidate deleted when |
//! |--------|------------------------|
//! | `KeepAll` | never (no walk) |
//! | `LatestOnly` | always |
//! | `LatestAndKeepLocked` | not locked, or locked with a positive retention period that has elapsed |
//!
//! Lock flags are read from the live record as each build is visited.
//! Failures on one build are logged and the walk continues.

use runkeep_artifacts::ArtifactManagerFactories;
use runkeep_core::{ArchiveSettings, BuildLog, BuildNumber, KeepPolicy, Outcome, Timestamp};
use runkeep_history::{HistorySnapshot, RunEntry};
use std::sync::Arc;
use tracing::{debug, warn};

/// What one retention pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Builds whose artifacts were kept
    pub retained: Vec<BuildNumber>,
    /// Builds whose artifacts were deleted (or were already absent)
    pub deleted: Vec<BuildNumber>,
    /// Builds passed over because they were still running
    pub skipped_building: Vec<BuildNumber>,
    /// Builds whose artifacts could not be deleted
    pub failed: Vec<BuildNumber>,
}

/// Verdict for one completed build that is not the best so far
fn should_delete(entry: &RunEntry, settings: &ArchiveSettings, now: Timestamp) -> bool {
    match settings.keep_policy {
        KeepPolicy::KeepAll => false,
        KeepPolicy::LatestOnly => true,
        KeepPolicy::LatestAndKeepLocked => {
            let run = entry.run();
            if !run.is_keep_forever() {
                return true;
            }
            let days = settings.locked_retention_days;
            if days == 0 {
                return false;
            }
            // A period reaching past the start of time has not elapsed
            match now.checked_sub_signed(chrono::Duration::days(i64::from(days))) {
                Some(cutoff) => run.start_time() < cutoff,
                None => false,
            }
        }
    }
}

/// Prunes artifacts of superseded builds
#[derive(Debug, Clone)]
pub struct RetentionEngine {
    factories: Arc<ArtifactManagerFactories>,
}

impl RetentionEngine {
    /// Engine deleting through the bound artifact managers
    pub fn new(factories: Arc<ArtifactManagerFactories>) -> Self {
        RetentionEngine { factories }
    }

    /// Apply `settings` to the builds in `snapshot`
    ///
    /// Progress lines go to `log`, normally the console of the build
    /// about to run.
    pub fn run(
        &self,
        snapshot: &HistorySnapshot,
        settings: &ArchiveSettings,
        now: Timestamp,
        log: &BuildLog,
    ) -> RetentionReport {
        let mut report = RetentionReport::default();
        if !settings.keep_policy.deletes_anything() {
            return report;
        }
        let start = match snapshot.last_completed() {
            Some(entry) => entry.number(),
            None => return report,
        };

        let mut best_so_far = Outcome::NotBuilt;
        for entry in snapshot.from_down(start) {
            let result = match entry.result() {
                Some(result) => result,
                None => {
                    report.skipped_building.push(entry.number());
                    continue;
                }
            };
            if result.is_better_than(best_so_far) {
                best_so_far = result;
                report.retained.push(entry.number());
                continue;
            }
            if !should_delete(entry, settings, now) {
                report.retained.push(entry.number());
                continue;
            }
            match self.delete_artifacts(entry, log) {
                Ok(()) => report.deleted.push(entry.number()),
                Err(e) => {
                    log.error(e.to_string());
                    warn!(build = %entry.run().display_name(), error = %e, "Failed to delete artifacts");
                    report.failed.push(entry.number());
                }
            }
        }

        debug!(
            policy = %settings.keep_policy,
            retained = report.retained.len(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Retention pass finished"
        );
        report
    }

    fn delete_artifacts(&self, entry: &RunEntry, log: &BuildLog) -> runkeep_core::Result<()> {
        let run = entry.run();
        let manager = self.factories.manager_for_run(run)?;
        if manager.root().exists() {
            log.info(format!("Deleting old artifacts from {}", run.display_name()));
            manager.delete()?;
        }
        Ok(())
    }
}
