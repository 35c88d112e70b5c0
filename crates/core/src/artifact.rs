//! Artifact manager capability
//!
//! Where a build's archived files physically live is pluggable. A build is
//! bound to exactly one [`ArtifactManager`] the first time it needs one;
//! the binding never changes afterwards. Implementations live in
//! `runkeep-artifacts` (the standard filesystem manager) or in the host
//! application.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

/// Storage backend for one build's archived files
pub trait ArtifactManager: Send + Sync + Debug {
    /// Short backend name, used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Copy files from `workspace` into the store
    ///
    /// `mapping` goes from the archived path to the path relative to
    /// `workspace`. Stores that support it overwrite existing entries.
    fn archive(&self, workspace: &Path, mapping: &BTreeMap<String, String>) -> Result<()>;

    /// Delete everything archived for this build
    ///
    /// Returns `Ok(false)` if there was nothing to delete. Absent storage
    /// is never an error.
    fn delete(&self) -> Result<bool>;

    /// Read-only view of the stored files
    fn root(&self) -> Box<dyn ArtifactView>;
}

/// Read-only view of archived files
pub trait ArtifactView: Send + Sync {
    /// Whether anything is stored
    fn exists(&self) -> bool;

    /// All stored files, sorted by relative path
    fn list(&self) -> Result<Vec<ArtifactEntry>>;

    /// Contents of one stored file
    fn read(&self, relative_path: &str) -> Result<Vec<u8>>;
}

/// One archived file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Path relative to the store root, `/`-separated
    pub relative_path: String,
    /// Size in bytes
    pub size: u64,
}

impl ArtifactEntry {
    /// Last path component
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}
