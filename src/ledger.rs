//! Main entry point for runkeep.
//!
//! This module provides the [`Ledger`], which owns every configured job
//! under one root directory.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use runkeep_artifacts::{ArchiveReport, ArtifactManagerFactory};
use runkeep_core::{
    BuildNumber, Error, JobConfig, LedgerConfig, Outcome, Result,
};
use runkeep_engine::{Job, JobServices};
use runkeep_history::{HistorySnapshot, RunListener, RunRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Build history and artifact retention for a set of jobs.
///
/// Jobs are independent: each has its own history, start lock and
/// retention pass, so activity on one job never blocks another.
///
/// # Example
///
/// ```ignore
/// use runkeep::prelude::*;
///
/// let ledger = Ledger::builder()
///     .root("/var/lib/runkeep")
///     .job(JobConfig::new("app").archive(ArchiveSettings::new("target/*.jar")))
///     .open()?;
///
/// let run = ledger.start_build("app", Default::default())?;
/// ledger.archive("app", run.number(), Some(workspace))?;
/// ledger.complete("app", run.number())?;
/// ```
#[derive(Debug)]
pub struct Ledger {
    root: PathBuf,
    jobs: DashMap<String, Arc<Job>>,
    services: JobServices,
}

impl Ledger {
    /// Open a ledger at `root` with no jobs configured yet.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::builder().root(root).open()
    }

    /// Open the ledger described by a configuration.
    pub fn from_config(config: LedgerConfig) -> Result<Self> {
        let LedgerConfig { root_dir, jobs } = config;
        jobs.into_iter()
            .fold(Self::builder().root(root_dir), |b, job| b.job(job))
            .open()
    }

    /// Open the ledger described by a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(LedgerConfig::load(path.as_ref())?)
    }

    /// Create a builder for ledger configuration.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::new()
    }

    /// Root data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a job, reloading its builds from disk.
    ///
    /// A job name can only be added once.
    pub fn add_job(&self, config: JobConfig) -> Result<Arc<Job>> {
        if self.jobs.contains_key(&config.name) {
            return Err(Error::Config(format!("job {} already exists", config.name)));
        }
        // Opened outside the map so the reload never holds a shard lock
        let job = Arc::new(Job::open(config, &self.root, self.services.clone())?);
        match self.jobs.entry(job.name().to_string()) {
            Entry::Occupied(_) => Err(Error::Config(format!("job {} already exists", job.name()))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&job));
                Ok(job)
            }
        }
    }

    /// Look up a job.
    pub fn job(&self, name: &str) -> Result<Arc<Job>> {
        self.jobs
            .get(name)
            .map(|j| Arc::clone(j.value()))
            .ok_or_else(|| Error::JobNotFound(name.to_string()))
    }

    /// Names of all jobs, sorted.
    pub fn job_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.iter().map(|j| j.key().clone()).collect();
        names.sort();
        names
    }

    /// Append an artifact manager factory to the chain.
    ///
    /// Builds that already have a manager keep it.
    pub fn register_factory(&self, factory: Arc<dyn ArtifactManagerFactory>) {
        self.services.factories.register(factory);
    }

    /// Register an observer of completed and deleted builds.
    pub fn register_listener(&self, listener: Arc<dyn RunListener>) {
        self.services.listeners.register(listener);
    }

    // =========================================================================
    // Per-job shortcuts
    // =========================================================================

    /// Start a build of `job`.
    pub fn start_build(&self, job: &str, environment: BTreeMap<String, String>) -> Result<Arc<RunRecord>> {
        self.job(job)?.start_build(environment)
    }

    /// Complete a build with its provisional outcome.
    pub fn complete(&self, job: &str, number: BuildNumber) -> Result<Outcome> {
        self.job(job)?.complete(number)
    }

    /// Downgrade by `outcome`, then complete.
    pub fn complete_with(&self, job: &str, number: BuildNumber, outcome: Outcome) -> Result<Outcome> {
        self.job(job)?.complete_with(number, outcome)
    }

    /// Interrupt a running build.
    pub fn abort(&self, job: &str, number: BuildNumber) -> Result<()> {
        self.job(job)?.abort(number)
    }

    /// Archive a running build's outputs.
    pub fn archive(&self, job: &str, number: BuildNumber, workspace: Option<&Path>) -> Result<ArchiveReport> {
        self.job(job)?.archive(number, workspace)
    }

    /// Lock or unlock a build.
    pub fn set_keep_forever(&self, job: &str, number: BuildNumber, keep: bool) -> Result<()> {
        self.job(job)?.set_keep_forever(number, keep)
    }

    /// Delete a build.
    pub fn delete(&self, job: &str, number: BuildNumber) -> Result<()> {
        self.job(job)?.delete(number)
    }

    /// Consistent view of a job's builds.
    pub fn snapshot(&self, job: &str) -> Result<HistorySnapshot> {
        Ok(self.job(job)?.snapshot())
    }
}

/// Builder for ledger configuration.
///
/// # Example
///
/// ```ignore
/// let ledger = Ledger::builder()
///     .root("./data")
///     .factory(Arc::new(MyRemoteStore))
///     .listener(Arc::new(AuditTrail))
///     .job(JobConfig::new("nightly"))
///     .open()?;
/// ```
#[derive(Default)]
pub struct LedgerBuilder {
    root: Option<PathBuf>,
    jobs: Vec<JobConfig>,
    factories: Vec<Arc<dyn ArtifactManagerFactory>>,
    listeners: Vec<Arc<dyn RunListener>>,
}

impl LedgerBuilder {
    /// Create a new builder with no root and no jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root data directory.
    pub fn root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Configure a job.
    pub fn job(mut self, config: JobConfig) -> Self {
        self.jobs.push(config);
        self
    }

    /// Append an artifact manager factory.
    pub fn factory(mut self, factory: Arc<dyn ArtifactManagerFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Register a run listener.
    pub fn listener(mut self, listener: Arc<dyn RunListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Open the ledger, creating the root directory and reloading every job.
    pub fn open(self) -> Result<Ledger> {
        let root = self
            .root
            .ok_or_else(|| Error::Config("ledger root directory not set".to_string()))?;
        std::fs::create_dir_all(&root)?;

        let services = JobServices::default();
        for factory in self.factories {
            services.factories.register(factory);
        }
        for listener in self.listeners {
            services.listeners.register(listener);
        }

        let ledger = Ledger {
            root,
            jobs: DashMap::new(),
            services,
        };
        for config in self.jobs {
            ledger.add_job(config)?;
        }
        info!(root = %ledger.root.display(), jobs = ledger.jobs.len(), "Opened ledger");
        Ok(ledger)
    }
}
