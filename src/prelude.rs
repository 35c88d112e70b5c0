//! Convenient imports for runkeep.
//!
//! ```ignore
//! use runkeep::prelude::*;
//!
//! let ledger = Ledger::open("./data")?;
//! ```

// Main entry point
pub use crate::ledger::{Ledger, LedgerBuilder};

// Error handling
pub use runkeep_core::{Error, Result};

// Core types
pub use runkeep_core::{ArchiveSettings, BuildNumber, JobConfig, KeepPolicy, Outcome};

// History
pub use runkeep_history::{HistorySnapshot, RunEntry, RunListener, RunRecord};

// Artifacts
pub use runkeep_artifacts::{ArchiveStatus, ArtifactManagerFactory};
pub use runkeep_core::{ArtifactEntry, ArtifactManager, ArtifactView};
