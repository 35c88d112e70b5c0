//! Retention Integration Tests
//!
//! Artifact pruning performed when a job starts a build:
//! - policies: keepAll, latestOnly and the best-so-far walk
//! - locking: latestAndKeepLocked with and without a retention period
//! - failures: storage errors on individual builds

#[path = "../common/mod.rs"]
mod common;

mod failures;
mod policies;

use common::*;
use runkeep::{ArchiveSettings, Job, JobConfig, KeepPolicy, Ledger, Outcome};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Job archiving `*.txt` under `policy`
fn retaining_job(ledger: &Ledger, settings: ArchiveSettings) -> Arc<Job> {
    ledger
        .add_job(JobConfig::new("app").concurrent(true).archive(settings))
        .unwrap()
}

fn settings(policy: KeepPolicy) -> ArchiveSettings {
    ArchiveSettings::new("*.txt").keep_policy(policy)
}

/// Run builds that each archive `out.txt`; `None` leaves the build running
fn archived_builds(job: &Job, root: &Path, states: &[Option<Outcome>]) {
    let ws = workspace(root, &["out.txt"]);
    for state in states {
        let run = job.start_build(BTreeMap::new()).unwrap();
        job.archive(run.number(), Some(&ws)).unwrap();
        if let Some(outcome) = state {
            job.complete_with(run.number(), *outcome).unwrap();
        }
    }
}

fn has_artifacts(job: &Job, number: u64) -> bool {
    job.dir().build(n(number)).archive_dir().exists()
}
