//! Traversal queries against a job's live history

use crate::common::*;
use runkeep::Outcome::*;

#[test]
fn test_over_threshold_example() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Failure), Some(Success), Some(Unstable), Some(Aborted), Some(NotBuilt)]);
    let snap = job.snapshot();

    let over = |t| -> Vec<u64> {
        snap.previous_over_threshold(n(5), 5, t)
            .iter()
            .map(|e| e.number().get())
            .collect()
    };
    assert_eq!(over(Failure), vec![3, 2, 1]);
    assert_eq!(over(Unstable), vec![3, 2]);
    assert_eq!(over(Success), vec![2]);
    assert_eq!(over(Aborted), vec![4, 3, 2, 1]);
}

#[test]
fn test_concurrent_builds_in_flight() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success), None, None]);
    let snap = job.snapshot();

    assert_eq!(snap.previous_completed(n(3)).unwrap().number(), n(1));
    assert_eq!(snap.previous_in_progress(n(3)).unwrap().number(), n(2));
    assert!(snap.previous_in_progress(n(2)).is_none());
}

#[test]
fn test_previous_built_across_abort() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success), None, None]);

    assert_eq!(job.snapshot().previous_built(n(3)).unwrap().number(), n(1));
    job.abort(n(2)).unwrap();
    assert_eq!(job.snapshot().previous_built(n(3)).unwrap().number(), n(1));
    // Aborted counts as completed
    assert_eq!(job.snapshot().previous_completed(n(3)).unwrap().number(), n(2));
}

#[test]
fn test_previous_not_failed_at_the_start() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Failure)]);
    assert!(job.snapshot().previous_not_failed(n(2)).is_none());
}

#[test]
fn test_snapshot_is_stable_while_builds_finish() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Failure), None, None]);

    let before = job.snapshot();
    job.complete(n(2)).unwrap();

    let first = before.previous_successful(n(3)).map(|e| e.number());
    assert_eq!(first, None);
    assert_eq!(before.previous_successful(n(3)).map(|e| e.number()), first);
    // A fresh snapshot sees the new result
    assert_eq!(job.snapshot().previous_successful(n(3)).unwrap().number(), n(2));
}

#[test]
fn test_deleted_builds_leave_gaps() {
    let (_temp, ledger) = create_ledger();
    let job = concurrent_job(&ledger, "app");
    populate(&job, &[Some(Success), Some(Failure), Some(Unstable)]);
    job.delete(n(2)).unwrap();

    let snap = job.snapshot();
    assert_eq!(snap.previous_build(n(3)).unwrap().number(), n(1));
    assert!(snap.previous_failed(n(3)).is_none());
    assert_eq!(job.history().next_of(n(1)).unwrap().number(), n(3));
}
