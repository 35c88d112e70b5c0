//! Storage failures during a retention pass

use super::*;
use parking_lot::Mutex;
use runkeep::{ArtifactManager, ArtifactManagerFactory, ArtifactView, FileView, LogLevel, RunRecord};
use runkeep::Outcome::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Files under `dir`; deletion fails for the numbers listed in `broken`
#[derive(Debug)]
struct BrittleStore {
    dir: PathBuf,
    number: u64,
    broken: Arc<Mutex<BTreeSet<u64>>>,
}

impl ArtifactManager for BrittleStore {
    fn name(&self) -> &'static str {
        "brittle"
    }

    fn archive(&self, workspace: &Path, mapping: &BTreeMap<String, String>) -> runkeep::Result<()> {
        for (dest, src) in mapping {
            std::fs::create_dir_all(&self.dir)?;
            std::fs::copy(workspace.join(src), self.dir.join(dest))?;
        }
        Ok(())
    }

    fn delete(&self) -> runkeep::Result<bool> {
        if self.broken.lock().contains(&self.number) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "device not ready").into());
        }
        std::fs::remove_dir_all(&self.dir)?;
        Ok(true)
    }

    fn root(&self) -> Box<dyn ArtifactView> {
        Box::new(FileView::new(&self.dir))
    }
}

struct BrittleFactory {
    base: PathBuf,
    broken: Arc<Mutex<BTreeSet<u64>>>,
}

impl ArtifactManagerFactory for BrittleFactory {
    fn manager_for(&self, run: &RunRecord) -> Option<Arc<dyn ArtifactManager>> {
        Some(Arc::new(BrittleStore {
            dir: self.base.join(run.number().to_string()),
            number: run.number().get(),
            broken: Arc::clone(&self.broken),
        }))
    }
}

#[test]
fn test_failed_delete_does_not_stop_the_walk() {
    let (temp, ledger) = create_ledger();
    let broken = Arc::new(Mutex::new(BTreeSet::new()));
    ledger.register_factory(Arc::new(BrittleFactory {
        base: temp.path().join("store"),
        broken: Arc::clone(&broken),
    }));
    let job = retaining_job(&ledger, settings(KeepPolicy::LatestOnly));
    archived_builds(&job, temp.path(), &[Some(Success); 4]);
    broken.lock().insert(2);

    let (next, report) = job.start_build_at(BTreeMap::new(), chrono::Utc::now()).unwrap();

    assert_eq!(nums(&report.retained), vec![4]);
    assert_eq!(nums(&report.deleted), vec![3, 1]);
    assert_eq!(nums(&report.failed), vec![2]);
    assert!(!temp.path().join("store/1").exists());
    assert!(temp.path().join("store/2/out.txt").is_file());
    assert!(!temp.path().join("store/3").exists());
    assert!(next.log().contains(LogLevel::Error, "device not ready"));
    // The failure never touches the records themselves
    assert_eq!(job.history().len(), 5);
    assert_eq!(job.get(n(2)).unwrap().result(), Some(Success));
}
