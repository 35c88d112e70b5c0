//! Shared fixtures for integration tests

#![allow(dead_code)]

use runkeep::{BuildNumber, Job, JobConfig, Ledger, Outcome};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Ledger in a fresh temporary directory
pub fn create_ledger() -> (TempDir, Ledger) {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let ledger = Ledger::open(temp.path()).unwrap();
    (temp, ledger)
}

/// Shorthand for build numbers
pub fn n(v: u64) -> BuildNumber {
    BuildNumber::new(v)
}

/// Numbers as plain integers
pub fn nums(v: &[BuildNumber]) -> Vec<u64> {
    v.iter().map(|b| b.get()).collect()
}

/// Start one build per entry; `None` leaves the build running
///
/// The job must allow concurrent builds when any entry but the last is `None`.
pub fn populate(job: &Job, states: &[Option<Outcome>]) -> Vec<BuildNumber> {
    states
        .iter()
        .map(|state| {
            let run = job.start_build(BTreeMap::new()).unwrap();
            match state {
                Some(Outcome::Aborted) => job.abort(run.number()).unwrap(),
                Some(outcome) => {
                    job.complete_with(run.number(), *outcome).unwrap();
                }
                None => {}
            }
            run.number()
        })
        .collect()
}

/// Concurrent job named `name`
pub fn concurrent_job(ledger: &Ledger, name: &str) -> Arc<Job> {
    ledger.add_job(JobConfig::new(name).concurrent(true)).unwrap()
}

/// Create files (contents = their path) under `root/ws`
pub fn workspace(root: &Path, files: &[&str]) -> PathBuf {
    let ws = root.join("ws");
    std::fs::create_dir_all(&ws).unwrap();
    for f in files {
        let path = ws.join(f);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, f).unwrap();
    }
    ws
}
