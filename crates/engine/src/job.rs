//! Job: one configured job and its build history
//!
//! ## Starting a build
//!
//! ```text
//! job lock ─┬─ history write lock ─┬─ admission (serial jobs refuse while busy)
//!           │                      ├─ number = max(last + 1, persisted next)
//!           │                      ├─ next number persisted
//!           │                      └─ record created and saved
//!           └─ retention pass, reported on the new build's log
//! ```
//!
//! The job lock also covers deletion and lock changes, so a build cannot
//! be locked between the deletion checks and the removal. It is per job:
//! nothing done to one job waits on another job.

use crate::retention::{RetentionEngine, RetentionReport};
use chrono::Utc;
use parking_lot::Mutex;
use runkeep_artifacts::{
    artifacts, artifacts_up_to, ArchiveReport, Archiver, ArtifactManagerFactories,
};
use runkeep_core::{
    ArtifactEntry, BuildNumber, Error, JobConfig, Outcome, Result, Timestamp,
};
use runkeep_history::{HistorySnapshot, ListenerRegistry, RunHistory, RunRecord};
use runkeep_storage::JobDir;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared services a job uses
#[derive(Debug, Clone, Default)]
pub struct JobServices {
    /// Artifact manager factory chain
    pub factories: Arc<ArtifactManagerFactories>,
    /// Observers of deleted and completed builds
    pub listeners: Arc<ListenerRegistry>,
}

/// A job and its builds
#[derive(Debug)]
pub struct Job {
    config: JobConfig,
    dir: JobDir,
    history: RunHistory,
    /// Serializes starts (with their retention pass), deletions and lock changes
    job_lock: Mutex<()>,
    /// Lowest number the next build may take; survives deletion of the latest build
    next_number: AtomicU64,
    services: JobServices,
    retention: RetentionEngine,
    archiver: Archiver,
}

impl Job {
    /// Open a job under `root`, reloading any builds on disk
    pub fn open(config: JobConfig, root: &Path, services: JobServices) -> Result<Self> {
        config.validate()?;
        let dir = JobDir::new(root, &config.name);
        dir.ensure()?;

        let history = RunHistory::new();
        let now = Utc::now();
        for stored in dir.list_builds()? {
            let path = stored.dir.path().to_path_buf();
            let run = RunRecord::from_stored(&config.name, stored, now);
            if let Err(e) = history.insert(Arc::new(run)) {
                warn!(job = %config.name, "Skipping build directory {}: {}", path.display(), e);
            }
        }

        let after_last = history
            .last()
            .map(|r| r.number().next())
            .unwrap_or(BuildNumber::FIRST);
        let next = dir
            .read_next_number()?
            .map_or(after_last, |persisted| persisted.max(after_last));

        info!(
            job = %config.name,
            builds = history.len(),
            next = %next,
            "Opened job"
        );

        Ok(Job {
            retention: RetentionEngine::new(Arc::clone(&services.factories)),
            archiver: Archiver::new(Arc::clone(&services.factories)),
            config,
            dir,
            history,
            job_lock: Mutex::new(()),
            next_number: AtomicU64::new(next.get()),
            services,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Job name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Job configuration
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Job directory
    pub fn dir(&self) -> &JobDir {
        &self.dir
    }

    /// Live build history
    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    /// Consistent view of the builds for traversal queries
    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    /// Number the next build will get
    pub fn next_number(&self) -> BuildNumber {
        BuildNumber::new(self.next_number.load(Ordering::SeqCst))
    }

    /// A build by number
    pub fn get(&self, number: BuildNumber) -> Result<Arc<RunRecord>> {
        self.history.get(number).ok_or(Error::BuildNotFound(number))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a new build now
    pub fn start_build(&self, environment: BTreeMap<String, String>) -> Result<Arc<RunRecord>> {
        self.start_build_at(environment, Utc::now()).map(|(run, _)| run)
    }

    /// Start a new build at `now`, returning what the retention pass did
    ///
    /// Fails with [`Error::JobBusy`] when the job does not allow concurrent
    /// builds and one is already running.
    pub fn start_build_at(
        &self,
        mut environment: BTreeMap<String, String>,
        now: Timestamp,
    ) -> Result<(Arc<RunRecord>, RetentionReport)> {
        let _guard = self.job_lock.lock();

        let floor = self.next_number();
        let concurrent = self.config.concurrent_builds;
        let run = self.history.insert_next(
            floor,
            |runs| {
                if !concurrent {
                    if let Some(busy) = runs.values().find(|r| r.is_building()) {
                        debug!(job = %self.name(), running = %busy.number(), "Refusing to start");
                        return Err(Error::JobBusy(self.name().to_string()));
                    }
                }
                Ok(())
            },
            |number| {
                // Persisted before the record exists
                let next = number.next();
                self.dir.write_next_number(next)?;
                self.next_number.store(next.get(), Ordering::SeqCst);
                environment.insert("BUILD_NUMBER".to_string(), number.to_string());
                environment.insert("JOB_NAME".to_string(), self.name().to_string());
                let run = RunRecord::new(self.name(), number, now, self.dir.build(number))
                    .with_environment(environment);
                run.save()?;
                Ok(run)
            },
        )?;
        info!(job = %self.name(), build = %run.number(), "Started build");

        let report = match &self.config.archive {
            Some(settings) => self
                .retention
                .run(&self.history.snapshot(), settings, now, run.log()),
            None => RetentionReport::default(),
        };
        Ok((run, report))
    }

    /// Downgrade a running build's provisional outcome
    pub fn downgrade(&self, number: BuildNumber, outcome: Outcome) -> Result<Outcome> {
        self.get(number)?.downgrade(outcome)
    }

    /// Complete a build with its provisional outcome
    pub fn complete(&self, number: BuildNumber) -> Result<Outcome> {
        let run = self.get(number)?;
        let result = run.complete()?;
        self.finished(&run)?;
        Ok(result)
    }

    /// Downgrade by `outcome`, then complete
    pub fn complete_with(&self, number: BuildNumber, outcome: Outcome) -> Result<Outcome> {
        let run = self.get(number)?;
        let result = run.complete_with(outcome)?;
        self.finished(&run)?;
        Ok(result)
    }

    /// Interrupt a running build
    pub fn abort(&self, number: BuildNumber) -> Result<()> {
        let run = self.get(number)?;
        run.abort()?;
        self.finished(&run)
    }

    fn finished(&self, run: &RunRecord) -> Result<()> {
        run.save()?;
        run.save_log()?;
        info!(
            job = %self.name(),
            build = %run.number(),
            result = %run.current_outcome(),
            "Build finished"
        );
        self.services.listeners.notify_completed(run);
        Ok(())
    }

    /// Archive a running build's outputs from `workspace`
    ///
    /// `workspace` is `None` when the node that ran the build is gone.
    pub fn archive(&self, number: BuildNumber, workspace: Option<&Path>) -> Result<ArchiveReport> {
        let settings = self.config.archive.as_ref().ok_or_else(|| {
            Error::Config(format!("job {} does not archive artifacts", self.name()))
        })?;
        let run = self.get(number)?;
        self.archiver.perform(&run, workspace, settings)
    }

    /// Lock or unlock a build against retention and deletion
    pub fn set_keep_forever(&self, number: BuildNumber, keep: bool) -> Result<()> {
        let _guard = self.job_lock.lock();
        let run = self.get(number)?;
        run.set_keep_forever(keep);
        run.save()?;
        debug!(job = %self.name(), build = %number, keep, "Changed lock");
        Ok(())
    }

    /// Delete a build: its artifacts, its directory and its history entry
    ///
    /// Running and locked builds cannot be deleted. Numbers are never
    /// reused or shifted.
    pub fn delete(&self, number: BuildNumber) -> Result<()> {
        let guard = self.job_lock.lock();
        let run = self.get(number)?;
        if run.is_building() {
            return Err(Error::consistency(format!(
                "{} is still running and cannot be deleted",
                run.display_name()
            )));
        }
        if run.is_keep_forever() {
            return Err(Error::consistency(format!(
                "{} is marked to be kept forever and cannot be deleted",
                run.display_name()
            )));
        }

        self.services.factories.manager_for_run(&run)?.delete()?;
        run.dir().remove()?;
        if self.history.remove(number).is_none() {
            return Err(Error::BuildNotFound(number));
        }
        drop(guard);
        info!(job = %self.name(), build = %number, "Deleted build");
        self.services.listeners.notify_deleted(&run);
        Ok(())
    }

    // =========================================================================
    // Artifacts
    // =========================================================================

    /// Archived files of a build
    pub fn artifacts(&self, number: BuildNumber) -> Result<Vec<ArtifactEntry>> {
        artifacts(&self.services.factories, &*self.get(number)?)
    }

    /// At most `limit` archived files of a build
    pub fn artifacts_up_to(&self, number: BuildNumber, limit: usize) -> Result<Vec<ArtifactEntry>> {
        artifacts_up_to(&self.services.factories, &*self.get(number)?, limit)
    }
}
