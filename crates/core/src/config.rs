//! Job and ledger configuration
//!
//! Configuration arrives already validated from the outside world (job
//! configuration pages, TOML files). The core only consumes these values.
//!
//! ```toml
//! root_dir = "/var/lib/runkeep"
//!
//! [[jobs]]
//! name = "app"
//! concurrent_builds = true
//!
//! [jobs.archive]
//! artifacts = "target/*.jar, docs/**"
//! excludes = "**/*.tmp"
//! keep_policy = "latestAndKeepLocked"
//! locked_retention_days = 14
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which builds keep their archived artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeepPolicy {
    /// Never delete artifacts
    #[default]
    KeepAll,
    /// Keep only the best-so-far chain of builds
    LatestOnly,
    /// Like `LatestOnly`, but locked builds keep their artifacts
    /// (forever, or for a number of days)
    LatestAndKeepLocked,
}

impl KeepPolicy {
    /// Whether the retention walk can delete anything under this policy
    pub fn deletes_anything(&self) -> bool {
        !matches!(self, KeepPolicy::KeepAll)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            KeepPolicy::KeepAll => "keepAll",
            KeepPolicy::LatestOnly => "latestOnly",
            KeepPolicy::LatestAndKeepLocked => "latestAndKeepLocked",
        }
    }
}

impl std::fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifact archiving and retention settings for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Comma- or whitespace-separated include patterns
    pub artifacts: String,
    /// Optional exclude patterns, same syntax
    pub excludes: Option<String>,
    /// Retention policy for archived artifacts
    pub keep_policy: KeepPolicy,
    /// Days locked builds keep artifacts under `LatestAndKeepLocked` (0 = forever)
    pub locked_retention_days: u32,
    /// Report an empty archive as a warning and leave the outcome alone
    pub allow_empty: bool,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        ArchiveSettings {
            artifacts: String::new(),
            excludes: None,
            keep_policy: KeepPolicy::KeepAll,
            locked_retention_days: 0,
            allow_empty: false,
        }
    }
}

impl ArchiveSettings {
    /// Settings archiving `artifacts` and keeping everything
    pub fn new(artifacts: impl Into<String>) -> Self {
        ArchiveSettings {
            artifacts: artifacts.into(),
            ..Default::default()
        }
    }

    /// Set exclude patterns
    pub fn excludes(mut self, excludes: impl Into<String>) -> Self {
        self.excludes = Some(excludes.into());
        self
    }

    /// Set the keep policy
    pub fn keep_policy(mut self, policy: KeepPolicy) -> Self {
        self.keep_policy = policy;
        self
    }

    /// Set locked retention days
    pub fn locked_retention_days(mut self, days: u32) -> Self {
        self.locked_retention_days = days;
        self
    }

    /// Permit empty archives
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Include expression with surrounding whitespace removed
    pub fn include_expr(&self) -> &str {
        self.artifacts.trim()
    }

    /// Exclude expression, `None` when absent or blank
    pub fn exclude_expr(&self) -> Option<&str> {
        self.excludes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Configuration for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name, unique within a ledger; also its directory name
    pub name: String,
    /// Allow more than one build of this job to run at a time
    #[serde(default)]
    pub concurrent_builds: bool,
    /// Archiving and retention; `None` means the job archives nothing
    #[serde(default)]
    pub archive: Option<ArchiveSettings>,
}

impl JobConfig {
    /// Job with defaults: serial builds, no archiving
    pub fn new(name: impl Into<String>) -> Self {
        JobConfig {
            name: name.into(),
            concurrent_builds: false,
            archive: None,
        }
    }

    /// Allow concurrent builds
    pub fn concurrent(mut self, allow: bool) -> Self {
        self.concurrent_builds = allow;
        self
    }

    /// Attach archive settings
    pub fn archive(mut self, settings: ArchiveSettings) -> Self {
        self.archive = Some(settings);
        self
    }

    /// Reject names that cannot be used as a directory name
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Config("job name must not be empty".to_string()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Config(format!("invalid job name: {}", self.name)));
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding all job and build data
    pub root_dir: PathBuf,
    /// Configured jobs
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

impl LedgerConfig {
    /// Parse from TOML text and validate every job
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LedgerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Validate jobs and reject duplicate names
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            job.validate()?;
            if !seen.insert(job.name.as_str()) {
                return Err(Error::Config(format!("duplicate job name: {}", job.name)));
            }
        }
        Ok(())
    }
}
