//! Build lifecycle through the facade

use crate::common::*;
use runkeep::{Error, JobConfig, Outcome};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

#[test]
fn test_start_complete_delete() {
    let (_temp, ledger) = create_ledger();
    ledger.add_job(JobConfig::new("app")).unwrap();

    let run = ledger.start_build("app", BTreeMap::new()).unwrap();
    assert!(run.is_building());
    assert_eq!(run.display_name(), "app #1");

    ledger.complete_with("app", run.number(), Outcome::Unstable).unwrap();
    assert_eq!(run.result(), Some(Outcome::Unstable));
    assert!(ledger
        .complete_with("app", run.number(), Outcome::Success)
        .unwrap_err()
        .is_consistency());
    assert_eq!(run.result(), Some(Outcome::Unstable));

    ledger.delete("app", run.number()).unwrap();
    assert!(ledger.snapshot("app").unwrap().is_empty());
    assert!(ledger.delete("app", run.number()).unwrap_err().is_not_found());
}

#[test]
fn test_abort_records_aborted() {
    let (_temp, ledger) = create_ledger();
    ledger.add_job(JobConfig::new("app")).unwrap();
    let run = ledger.start_build("app", BTreeMap::new()).unwrap();

    ledger.abort("app", run.number()).unwrap();
    assert_eq!(run.result(), Some(Outcome::Aborted));
    // A new build may start now
    assert_eq!(ledger.start_build("app", BTreeMap::new()).unwrap().number(), n(2));
}

#[test]
fn test_unknown_job() {
    let (_temp, ledger) = create_ledger();
    let err = ledger.start_build("ghost", BTreeMap::new()).unwrap_err();
    assert!(matches!(err, Error::JobNotFound(ref name) if name == "ghost"));
}

#[test]
fn test_jobs_are_independent() {
    let (_temp, ledger) = create_ledger();
    let ledger = Arc::new(ledger);
    for name in ["a", "b", "c", "d"] {
        ledger.add_job(JobConfig::new(name).concurrent(true)).unwrap();
    }

    let handles: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..25 {
                    let run = ledger.start_build(name, BTreeMap::new()).unwrap();
                    ledger.complete(name, run.number()).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for name in ["a", "b", "c", "d"] {
        let snap = ledger.snapshot(name).unwrap();
        assert_eq!(snap.len(), 25);
        assert_eq!(snap.last().unwrap().number(), n(25));
    }
}

#[test]
fn test_running_build_cannot_be_deleted() {
    let (_temp, ledger) = create_ledger();
    ledger.add_job(JobConfig::new("app")).unwrap();
    let run = ledger.start_build("app", BTreeMap::new()).unwrap();

    assert!(ledger.delete("app", run.number()).unwrap_err().is_consistency());
    assert!(ledger.job("app").unwrap().get(run.number()).is_ok());
}
