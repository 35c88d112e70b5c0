//! Core types shared across the workspace
//!
//! - [`BuildNumber`]: per-job build identifier
//! - [`Timestamp`]: wall-clock instant used for build start times

use serde::{Deserialize, Serialize};

/// Wall-clock instant (UTC)
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Per-job build number
///
/// Numbers are positive, unique within a job, strictly increasing in
/// creation order and never reused. Two builds are neighbours when their
/// numbers are adjacent in the job's history, regardless of which finished
/// first.
///
/// # Examples
///
/// ```
/// use runkeep_core::BuildNumber;
///
/// let first = BuildNumber::FIRST;
/// assert_eq!(first.get(), 1);
/// assert_eq!(first.next(), BuildNumber::new(2));
/// assert_eq!(first.to_string(), "1");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    /// The number given to a job's first build
    pub const FIRST: BuildNumber = BuildNumber(1);

    /// Wrap a raw number
    pub const fn new(n: u64) -> Self {
        BuildNumber(n)
    }

    /// Raw value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The number after this one
    pub const fn next(self) -> Self {
        BuildNumber(self.0 + 1)
    }
}

impl From<u64> for BuildNumber {
    fn from(n: u64) -> Self {
        BuildNumber(n)
    }
}

impl std::fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable build name, `"<job> #<number>"`
pub fn display_name(job: &str, number: BuildNumber) -> String {
    format!("{} #{}", job, number)
}
