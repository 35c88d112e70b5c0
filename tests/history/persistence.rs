//! Reloading history from disk

use crate::common::*;
use runkeep::{BuildDir, JobConfig, Ledger, Outcome};
use runkeep::Outcome::*;
use std::collections::BTreeMap;

#[test]
fn test_reload_restores_history() {
    let (temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success), Some(Aborted), None]);
    job.set_keep_forever(n(1), true).unwrap();
    drop(job);
    drop(ledger);

    let ledger = Ledger::builder()
        .root(temp.path())
        .job(JobConfig::new("app").concurrent(true))
        .open()
        .unwrap();
    let job = ledger.job("app").unwrap();
    let results: Vec<_> = job.snapshot().entries().iter().map(|e| e.result()).collect();
    // The build still running at shutdown comes back failed
    assert_eq!(
        results,
        vec![Some(Outcome::Success), Some(Outcome::Aborted), Some(Outcome::Failure)]
    );
    assert!(job.get(n(1)).unwrap().is_keep_forever());
    assert_eq!(job.start_build(BTreeMap::new()).unwrap().number(), n(4));
}

#[test]
fn test_reload_accepts_legacy_directories() {
    let (temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success)]);
    let legacy = job.dir().builds_dir().join("2013-11-18_10-35-49");
    std::fs::rename(job.dir().build(n(1)).path(), &legacy).unwrap();
    drop(job);
    drop(ledger);

    let ledger = Ledger::builder()
        .root(temp.path())
        .job(JobConfig::new("app"))
        .open()
        .unwrap();
    let job = ledger.job("app").unwrap();
    let run = job.get(n(1)).unwrap();
    assert_eq!(run.dir(), &BuildDir::at(legacy));
    assert_eq!(run.result(), Some(Outcome::Success));
}

#[test]
fn test_deleted_latest_number_is_not_reused_after_reload() {
    let (temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success), Some(Success)]);
    job.delete(n(2)).unwrap();
    drop(job);
    drop(ledger);

    let ledger = Ledger::builder()
        .root(temp.path())
        .job(JobConfig::new("app"))
        .open()
        .unwrap();
    let run = ledger.start_build("app", BTreeMap::new()).unwrap();
    assert_eq!(run.number(), n(3));
}
