//! Run listeners

use crate::common::*;
use parking_lot::Mutex;
use runkeep::{JobConfig, Ledger, Outcome, RunListener, RunRecord};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct Audit {
    deleted: Mutex<Vec<String>>,
    completed: Mutex<Vec<(String, Option<Outcome>)>>,
}

impl RunListener for Audit {
    fn on_deleted(&self, run: &RunRecord) {
        self.deleted.lock().push(run.display_name());
    }

    fn on_completed(&self, run: &RunRecord) {
        self.completed.lock().push((run.display_name(), run.result()));
    }
}

#[test]
fn test_deletion_is_observed_after_removal() {
    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let audit = Arc::new(Audit::default());
    let ledger = Ledger::builder()
        .root(temp.path())
        .listener(audit.clone())
        .job(JobConfig::new("app").concurrent(true))
        .open()
        .unwrap();
    let job = ledger.job("app").unwrap();
    populate(&job, &[Some(Outcome::Success), Some(Outcome::Failure), Some(Outcome::Success)]);

    ledger.delete("app", n(2)).unwrap();

    assert_eq!(*audit.deleted.lock(), vec!["app #2".to_string()]);
    assert!(job.get(n(2)).is_err());
    assert!(!job.dir().build(n(2)).exists());
    // Survivors keep their numbers
    assert_eq!(
        job.history().numbers().iter().map(|b| b.get()).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[test]
fn test_completion_is_observed() {
    let (_temp, ledger) = create_ledger();
    let audit = Arc::new(Audit::default());
    ledger.register_listener(audit.clone());
    ledger.add_job(JobConfig::new("app")).unwrap();

    let run = ledger.start_build("app", BTreeMap::new()).unwrap();
    ledger.complete_with("app", run.number(), Outcome::Unstable).unwrap();
    let run = ledger.start_build("app", BTreeMap::new()).unwrap();
    ledger.abort("app", run.number()).unwrap();

    assert_eq!(
        *audit.completed.lock(),
        vec![
            ("app #1".to_string(), Some(Outcome::Unstable)),
            ("app #2".to_string(), Some(Outcome::Aborted)),
        ]
    );
    assert!(audit.deleted.lock().is_empty());
}

#[test]
fn test_refused_deletion_is_not_observed() {
    let (_temp, ledger) = create_ledger();
    let audit = Arc::new(Audit::default());
    ledger.register_listener(audit.clone());
    ledger.add_job(JobConfig::new("app")).unwrap();
    let run = ledger.start_build("app", BTreeMap::new()).unwrap();

    assert!(ledger.delete("app", run.number()).is_err());
    assert!(audit.deleted.lock().is_empty());
}

#[test]
fn test_racing_deletes_notify_once() {
    let (_temp, ledger) = create_ledger();
    let audit = Arc::new(Audit::default());
    ledger.register_listener(audit.clone());
    let job = ledger.add_job(JobConfig::new("app").concurrent(true)).unwrap();

    for round in 1..=50u64 {
        let run = job.start_build(BTreeMap::new()).unwrap();
        job.complete(run.number()).unwrap();
        assert_eq!(run.number(), n(round));

        let barrier = Arc::new(std::sync::Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let job = Arc::clone(&job);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    job.delete(n(round))
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(r, Err(e) if e.is_not_found())));
    }
    assert_eq!(audit.deleted.lock().len(), 50);
}
