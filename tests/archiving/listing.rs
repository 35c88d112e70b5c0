//! Browsing archived files

use crate::common::*;
use runkeep::{ArchiveSettings, JobConfig};
use std::collections::BTreeMap;

#[test]
fn test_listing_sorted_and_capped() {
    let (temp, ledger) = create_ledger();
    let ws = workspace(temp.path(), &["z.log", "a/b.log", "m.log", "skip.txt"]);
    let job = ledger
        .add_job(JobConfig::new("app").archive(ArchiveSettings::new("**/*.log")))
        .unwrap();
    let run = job.start_build(BTreeMap::new()).unwrap();
    job.archive(run.number(), Some(&ws)).unwrap();
    job.complete(run.number()).unwrap();

    let all = job.artifacts(run.number()).unwrap();
    let paths: Vec<_> = all.iter().map(|a| a.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["a/b.log", "m.log", "z.log"]);
    assert_eq!(all[0].file_name(), "b.log");
    assert_eq!(all[0].size, "a/b.log".len() as u64);

    let capped = job.artifacts_up_to(run.number(), 2).unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[1].relative_path, "m.log");
}

#[test]
fn test_listing_unknown_build() {
    let (_temp, ledger) = create_ledger();
    let job = ledger.add_job(JobConfig::new("app")).unwrap();
    assert!(job.artifacts(n(9)).unwrap_err().is_not_found());
}

#[test]
fn test_read_archived_file() {
    let (temp, ledger) = create_ledger();
    let ws = workspace(temp.path(), &["report.html"]);
    let job = ledger
        .add_job(JobConfig::new("app").archive(ArchiveSettings::new("report.html")))
        .unwrap();
    let run = job.start_build(BTreeMap::new()).unwrap();
    job.archive(run.number(), Some(&ws)).unwrap();

    let manager = run.artifact_manager().unwrap();
    assert_eq!(manager.root().read("report.html").unwrap(), b"report.html");
}
