//! # runkeep
//!
//! Build history, outcome ordering and artifact retention for CI servers.
//!
//! runkeep tracks every build of every job, orders results on a fixed
//! lattice, answers "what happened before this build" queries, archives
//! build outputs and prunes artifacts of superseded builds.
//!
//! ## Quick Start
//!
//! ```ignore
//! use runkeep::prelude::*;
//!
//! let ledger = Ledger::load("runkeep.toml")?;
//!
//! let run = ledger.start_build("app", Default::default())?;
//! ledger.archive("app", run.number(), Some(workspace))?;
//! ledger.complete("app", run.number())?;
//!
//! let snapshot = ledger.snapshot("app")?;
//! let last_good = snapshot.previous_successful(run.number());
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `runkeep-core` | [`Outcome`], [`BuildNumber`], configuration, [`Error`] |
//! | `runkeep-storage` | on-disk layout of jobs and builds |
//! | `runkeep-history` | [`RunRecord`], [`RunHistory`], traversal queries |
//! | `runkeep-artifacts` | artifact managers, pattern matching, archiving |
//! | `runkeep-engine` | [`Job`], retention |

#![warn(missing_docs)]

mod ledger;

pub mod prelude;

pub use ledger::{Ledger, LedgerBuilder};

pub use runkeep_artifacts::{
    artifacts, artifacts_up_to, ArchiveReport, ArchiveStatus, Archiver, ArtifactManagerFactories,
    ArtifactManagerFactory, FileView, GlobMatcher, PatternMatcher, StandardArtifactManager,
};
pub use runkeep_core::{
    display_name, ArchiveSettings, ArtifactEntry, ArtifactManager, ArtifactView, BuildLog,
    BuildNumber, Error, JobConfig, KeepPolicy, LedgerConfig, LogLevel, LogLine, Outcome, Result,
    Timestamp,
};
pub use runkeep_engine::{Job, JobServices, RetentionEngine, RetentionReport};
pub use runkeep_history::{
    HistorySnapshot, ListenerRegistry, RunEntry, RunHistory, RunListener, RunRecord,
};
pub use runkeep_storage::{BuildDir, JobDir};
