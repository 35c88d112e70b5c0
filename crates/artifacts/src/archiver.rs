//! Archiving Operation
//!
//! Runs inside a build, after the workspace has produced its outputs:
//!
//! ```text
//! include expr ──trim──▶ empty? ──yes──▶ error, downgrade to FAILURE
//!      │
//!      ▼
//! workspace gone? ──yes──▶ nothing to do
//!      │
//!      ▼
//! expand ${VAR} ──▶ select files ──▶ none? ──▶ report (+ hint), maybe FAILURE
//!                         │            │
//!                  bad glob? ──▶ error, FAILURE
//!                                      ▼
//!                            bound manager.archive()
//! ```
//!
//! A malformed pattern fails the build even when empty archives are
//! allowed. A failed copy is reported on the build's log and leaves the
//! outcome as it was.

use crate::env::expand;
use crate::factory::ArtifactManagerFactories;
use crate::pattern::{GlobMatcher, PatternMatcher};
use runkeep_core::{ArchiveSettings, Error, Outcome, Result};
use runkeep_history::RunRecord;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// How an archiving step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// Files were copied
    Archived,
    /// No include patterns configured
    NoIncludes,
    /// The workspace is unavailable
    NoWorkspace,
    /// The patterns matched no file
    NothingMatched,
    /// A pattern could not be parsed
    InvalidPattern,
    /// Copying failed part way
    Failed,
}

/// Result of one archiving step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Files copied into the store
    pub copied: usize,
    /// How the step ended
    pub status: ArchiveStatus,
}

impl ArchiveReport {
    fn empty(status: ArchiveStatus) -> Self {
        ArchiveReport { copied: 0, status }
    }
}

/// Copies workspace files matching a job's patterns into the build's store
pub struct Archiver {
    matcher: Arc<dyn PatternMatcher>,
    factories: Arc<ArtifactManagerFactories>,
}

impl Archiver {
    /// Archiver using the glob matcher
    pub fn new(factories: Arc<ArtifactManagerFactories>) -> Self {
        Self::with_matcher(factories, Arc::new(GlobMatcher::new()))
    }

    /// Archiver using a custom matcher
    pub fn with_matcher(
        factories: Arc<ArtifactManagerFactories>,
        matcher: Arc<dyn PatternMatcher>,
    ) -> Self {
        Archiver { matcher, factories }
    }

    /// Archive `run`'s outputs from `workspace`
    ///
    /// Reporting happens on the build's log. The returned error is reserved
    /// for misuse, such as archiving a build that has already completed.
    pub fn perform(
        &self,
        run: &RunRecord,
        workspace: Option<&Path>,
        settings: &ArchiveSettings,
    ) -> Result<ArchiveReport> {
        let log = run.log();
        let includes = settings.include_expr();
        if includes.is_empty() {
            log.error("No artifacts are configured for archiving");
            run.downgrade(Outcome::Failure)?;
            return Ok(ArchiveReport::empty(ArchiveStatus::NoIncludes));
        }

        log.info("Archiving artifacts");
        let workspace = match workspace {
            Some(ws) if ws.is_dir() => ws,
            _ => return Ok(ArchiveReport::empty(ArchiveStatus::NoWorkspace)),
        };

        let includes = expand(includes, run.environment());
        let warn_or_error = |message: String| {
            if settings.allow_empty {
                log.warn(message);
            } else {
                log.error(message);
            }
        };

        let selected = match self.matcher.select(workspace, &includes, settings.exclude_expr()) {
            Ok(files) => files,
            Err(e @ Error::InvalidPattern { .. }) => {
                log.error(format!("Failed to archive artifacts: {}", e));
                run.downgrade(Outcome::Failure)?;
                return Ok(ArchiveReport::empty(ArchiveStatus::InvalidPattern));
            }
            Err(e) => {
                log.error(format!("Failed to archive artifacts: {}: {}", includes, e));
                return Ok(ArchiveReport::empty(ArchiveStatus::Failed));
            }
        };

        let files = match selected {
            files if !files.is_empty() => files,
            _ => {
                if run.current_outcome().is_better_or_equal(Outcome::Unstable) {
                    // A failed build probably never got as far as producing artifacts
                    warn_or_error(format!(
                        "No artifacts found that match the file pattern \"{}\". Configuration error?",
                        includes
                    ));
                    let hint = match self.matcher.validate(workspace, &includes) {
                        Ok(hint) => hint,
                        Err(e) => Some(e.to_string()),
                    };
                    if let Some(hint) = hint {
                        warn_or_error(hint);
                    }
                }
                if !settings.allow_empty {
                    run.downgrade(Outcome::Failure)?;
                }
                return Ok(ArchiveReport::empty(ArchiveStatus::NothingMatched));
            }
        };

        let mapping: BTreeMap<String, String> =
            files.iter().map(|f| (f.clone(), f.clone())).collect();
        let manager = self.factories.manager_for_run(run)?;
        if let Err(e) = manager.archive(workspace, &mapping) {
            log.error(format!("Failed to archive artifacts: {}: {}", includes, e));
            return Ok(ArchiveReport::empty(ArchiveStatus::Failed));
        }

        Ok(ArchiveReport {
            copied: mapping.len(),
            status: ArchiveStatus::Archived,
        })
    }
}

impl std::fmt::Debug for Archiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archiver")
            .field("factories", &self.factories)
            .finish()
    }
}
