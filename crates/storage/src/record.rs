//! Build record file (`build.json`)
//!
//! The persisted form of a build: its number, result, start time, lock flag
//! and environment. Written atomically (temp file + rename) so a crash never
//! leaves a half-written record behind.

use runkeep_core::{BuildNumber, Outcome, Result, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the record inside a build directory
pub const RECORD_FILE_NAME: &str = "build.json";

/// Persisted build record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFile {
    /// Build number
    pub number: BuildNumber,
    /// Terminal result, absent if the build never finished
    #[serde(default)]
    pub result: Option<Outcome>,
    /// When the build started; legacy records may lack it
    #[serde(default)]
    pub start_time: Option<Timestamp>,
    /// Locked against retention
    #[serde(default)]
    pub keep_forever: bool,
    /// Environment the build ran with
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl BuildFile {
    /// Record for a build that just started
    pub fn started(number: BuildNumber, start_time: Timestamp) -> Self {
        BuildFile {
            number,
            result: None,
            start_time: Some(start_time),
            keep_forever: false,
            environment: BTreeMap::new(),
        }
    }

    /// Write to `path` atomically
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read from `path`
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
