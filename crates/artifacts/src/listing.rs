//! Listing a build's archived files

use crate::factory::ArtifactManagerFactories;
use runkeep_core::{ArtifactEntry, Result};
use runkeep_history::RunRecord;

/// All archived files of `run`, sorted by relative path
pub fn artifacts(factories: &ArtifactManagerFactories, run: &RunRecord) -> Result<Vec<ArtifactEntry>> {
    factories.manager_for_run(run)?.root().list()
}

/// At most `limit` archived files of `run`, sorted by relative path
pub fn artifacts_up_to(
    factories: &ArtifactManagerFactories,
    run: &RunRecord,
    limit: usize,
) -> Result<Vec<ArtifactEntry>> {
    let mut entries = artifacts(factories, run)?;
    entries.truncate(limit);
    Ok(entries)
}
