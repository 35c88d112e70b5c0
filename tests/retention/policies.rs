//! Keep policies and the best-so-far walk

use super::*;
use runkeep::Outcome::*;

#[test]
fn test_keep_all_never_deletes() {
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::KeepAll));
    archived_builds(&job, temp.path(), &[Some(Success), Some(Failure), Some(Success)]);

    let (_, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();
    assert!(report.deleted.is_empty());
    assert!((1..=3).all(|i| has_artifacts(&job, i)));
}

#[test]
fn test_latest_only_example() {
    // Oldest to newest: FAILURE, SUCCESS, UNSTABLE
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Failure), Some(Success), Some(Unstable)]);

    let (_, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();
    assert_eq!(nums(&report.retained), vec![3, 2]);
    assert_eq!(nums(&report.deleted), vec![1]);
    assert!(has_artifacts(&job, 3));
    assert!(has_artifacts(&job, 2));
    assert!(!has_artifacts(&job, 1));
    // Records survive; only artifacts go
    assert_eq!(job.history().len(), 4);
}

#[test]
fn test_single_failure_is_retained() {
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Failure)]);

    let (_, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();
    assert_eq!(nums(&report.retained), vec![1]);
    assert!(has_artifacts(&job, 1));
}

#[test]
fn test_aborted_builds_are_candidates() {
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Success), Some(Aborted)]);

    // ABORTED is not better than the NOT_BUILT baseline
    let (_, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();
    assert_eq!(nums(&report.deleted), vec![2]);
    assert_eq!(nums(&report.retained), vec![1]);
}

#[test]
fn test_running_builds_are_never_touched() {
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Success), None, Some(Success)]);

    let (_, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();
    assert_eq!(nums(&report.skipped_building), vec![2]);
    assert_eq!(nums(&report.deleted), vec![1]);
    assert!(has_artifacts(&job, 2));
}

#[test]
fn test_retention_is_logged_on_the_new_build() {
    let (temp, ledger) = create_ledger();
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Success), Some(Success)]);

    let run = job.start_build(BTreeMap::new()).unwrap();
    job.complete(run.number()).unwrap();
    let log = job.dir().build(run.number()).read_log().unwrap();
    assert!(log.contains("Deleting old artifacts from app #1"));
}
