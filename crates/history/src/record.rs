//! Run Record: one build of a job
//!
//! ## Lifecycle
//!
//! ```text
//!   created (number reserved, no result)
//!      │  downgrade(..)*          provisional outcome only gets worse
//!      ▼
//!   complete() / complete_with(o) / abort()
//!      │                          result published exactly once
//!      ▼
//!   completed (result immutable)
//! ```
//!
//! The terminal result lives in a once-cell: publishing it happens-before
//! every later read, and once set it is read without locking. Cancellation
//! publishes `Aborted`; a build never ends with "no result".
//!
//! `keep_forever` is an atomic flag an operator may flip at any time;
//! readers always see the current value.

use chrono::Duration;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use runkeep_core::{
    display_name, ArtifactManager, BuildLog, BuildNumber, Error, Outcome, Result, Timestamp,
};
use runkeep_storage::{BuildDir, BuildFile, StoredBuild};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One execution of a job
#[derive(Debug)]
pub struct RunRecord {
    job: String,
    number: BuildNumber,
    start_time: Timestamp,
    /// Terminal result; empty while building
    result: OnceCell<Outcome>,
    /// Outcome so far while building. Guards publication of `result`.
    provisional: Mutex<Outcome>,
    keep_forever: AtomicBool,
    environment: BTreeMap<String, String>,
    dir: BuildDir,
    log: BuildLog,
    artifact_manager: OnceCell<Arc<dyn ArtifactManager>>,
}

impl RunRecord {
    /// Create a record for a build that is starting now
    pub fn new(job: impl Into<String>, number: BuildNumber, start_time: Timestamp, dir: BuildDir) -> Self {
        let job = job.into();
        let log = BuildLog::new(display_name(&job, number));
        RunRecord {
            job,
            number,
            start_time,
            result: OnceCell::new(),
            provisional: Mutex::new(Outcome::Success),
            keep_forever: AtomicBool::new(false),
            environment: BTreeMap::new(),
            dir,
            log,
            artifact_manager: OnceCell::new(),
        }
    }

    /// Attach the build environment (before the record is shared)
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Rebuild a record from disk
    ///
    /// A record saved without a result belongs to a build that never
    /// finished (the process went away mid-build); it comes back as
    /// `Failure`. A record without a start time falls back to `fallback_time`.
    pub fn from_stored(job: impl Into<String>, stored: StoredBuild, fallback_time: Timestamp) -> Self {
        let StoredBuild { dir, record } = stored;
        let result = record.result.unwrap_or(Outcome::Failure);
        let run = RunRecord::new(job, record.number, record.start_time.unwrap_or(fallback_time), dir)
            .with_environment(record.environment);
        run.keep_forever.store(record.keep_forever, Ordering::SeqCst);
        *run.provisional.lock() = result;
        // Fresh cell, cannot already be set
        let _ = run.result.set(result);
        run
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Owning job name
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Build number
    pub fn number(&self) -> BuildNumber {
        self.number
    }

    /// `"<job> #<number>"`
    pub fn display_name(&self) -> String {
        display_name(&self.job, self.number)
    }

    /// When the build started
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Time elapsed since the build started, as of `now`
    pub fn age(&self, now: Timestamp) -> Duration {
        now.signed_duration_since(self.start_time)
    }

    /// Build environment
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Build directory
    pub fn dir(&self) -> &BuildDir {
        &self.dir
    }

    /// Console log
    pub fn log(&self) -> &BuildLog {
        &self.log
    }

    // =========================================================================
    // Result
    // =========================================================================

    /// Terminal result, `None` while building
    pub fn result(&self) -> Option<Outcome> {
        self.result.get().copied()
    }

    /// True until the result is published
    pub fn is_building(&self) -> bool {
        self.result.get().is_none()
    }

    /// Result if completed, otherwise the provisional outcome so far
    ///
    /// Only steps running inside the build use this. History traversal
    /// never does.
    pub fn current_outcome(&self) -> Outcome {
        match self.result.get() {
            Some(result) => *result,
            None => *self.provisional.lock(),
        }
    }

    /// Worsen the provisional outcome of a running build
    ///
    /// An outcome better than the current one is ignored. Fails with a
    /// consistency error once the build has completed.
    pub fn downgrade(&self, outcome: Outcome) -> Result<Outcome> {
        let mut provisional = self.provisional.lock();
        if let Some(result) = self.result.get() {
            return Err(Error::consistency(format!(
                "{} already completed with {}",
                self.display_name(),
                result
            )));
        }
        *provisional = provisional.combine(outcome);
        Ok(*provisional)
    }

    /// Publish the provisional outcome as the terminal result
    pub fn complete(&self) -> Result<Outcome> {
        let provisional = self.provisional.lock();
        self.publish(*provisional)?;
        Ok(*provisional)
    }

    /// Downgrade by `outcome`, then complete
    pub fn complete_with(&self, outcome: Outcome) -> Result<Outcome> {
        let mut provisional = self.provisional.lock();
        let result = provisional.combine(outcome);
        self.publish(result)?;
        *provisional = result;
        Ok(result)
    }

    /// Interrupt the build: its result becomes `Aborted`
    pub fn abort(&self) -> Result<()> {
        let mut provisional = self.provisional.lock();
        self.publish(Outcome::Aborted)?;
        *provisional = Outcome::Aborted;
        Ok(())
    }

    fn publish(&self, outcome: Outcome) -> Result<()> {
        self.result.set(outcome).map_err(|_| {
            Error::consistency(format!(
                "result of {} is already set to {}",
                self.display_name(),
                self.result().map(|r| r.as_str()).unwrap_or("?")
            ))
        })
    }

    // =========================================================================
    // Lock flag
    // =========================================================================

    /// Whether the build is locked against retention
    pub fn is_keep_forever(&self) -> bool {
        self.keep_forever.load(Ordering::SeqCst)
    }

    /// Lock or unlock the build
    pub fn set_keep_forever(&self, keep: bool) {
        self.keep_forever.store(keep, Ordering::SeqCst);
    }

    // =========================================================================
    // Artifact binding
    // =========================================================================

    /// The bound artifact manager, if one has been chosen
    pub fn artifact_manager(&self) -> Option<Arc<dyn ArtifactManager>> {
        self.artifact_manager.get().cloned()
    }

    /// The bound artifact manager, choosing it with `pick` on first access
    ///
    /// `pick` runs at most once per record unless it fails; concurrent
    /// callers all observe the same binding.
    pub fn artifact_manager_or_init<F>(&self, pick: F) -> Result<Arc<dyn ArtifactManager>>
    where
        F: FnOnce(&RunRecord) -> Result<Arc<dyn ArtifactManager>>,
    {
        self.artifact_manager
            .get_or_try_init(|| pick(self))
            .map(Arc::clone)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Persisted form of the record
    pub fn to_build_file(&self) -> BuildFile {
        BuildFile {
            number: self.number,
            result: self.result(),
            start_time: Some(self.start_time),
            keep_forever: self.is_keep_forever(),
            environment: self.environment.clone(),
        }
    }

    /// Write `build.json`
    pub fn save(&self) -> Result<()> {
        self.dir.save(&self.to_build_file())
    }

    /// Write the console log to the build directory
    pub fn save_log(&self) -> Result<()> {
        self.dir.write_log(&self.log.render())
    }
}
