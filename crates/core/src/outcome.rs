//! Build outcome lattice
//!
//! A finished build carries exactly one [`Outcome`]. Outcomes form a fixed
//! total order, best to worst:
//!
//! | Rank | Outcome | Meaning |
//! |------|---------|---------|
//! | 4 | `SUCCESS` | Build completed without problems |
//! | 3 | `UNSTABLE` | Build completed, but tests or checks reported problems |
//! | 2 | `FAILURE` | Build failed |
//! | 1 | `NOT_BUILT` | Build was skipped before doing any work |
//! | 0 | `ABORTED` | Build was interrupted |
//!
//! Every comparison in the workspace goes through [`Outcome::compare`]. A
//! build that is still running has no outcome at all; callers model that as
//! `Option<Outcome>` and never substitute a placeholder value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::Error;

/// Terminal status of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Build completed without problems
    Success,
    /// Build completed but is considered unstable (e.g. test failures)
    Unstable,
    /// Build failed
    Failure,
    /// Build was never actually run
    NotBuilt,
    /// Build was interrupted
    Aborted,
}

impl Outcome {
    /// All outcomes, best first
    pub const ALL: [Outcome; 5] = [
        Outcome::Success,
        Outcome::Unstable,
        Outcome::Failure,
        Outcome::NotBuilt,
        Outcome::Aborted,
    ];

    fn rank(self) -> u8 {
        match self {
            Outcome::Success => 4,
            Outcome::Unstable => 3,
            Outcome::Failure => 2,
            Outcome::NotBuilt => 1,
            Outcome::Aborted => 0,
        }
    }

    /// Compare two outcomes. `Greater` means `self` is better than `other`.
    pub fn compare(self, other: Outcome) -> Ordering {
        self.rank().cmp(&other.rank())
    }

    /// Strictly better than `other`
    pub fn is_better_than(self, other: Outcome) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Better than or equal to `other`
    pub fn is_better_or_equal(self, other: Outcome) -> bool {
        self.compare(other) != Ordering::Less
    }

    /// Strictly worse than `other`
    pub fn is_worse_than(self, other: Outcome) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Worse than or equal to `other`
    pub fn is_worse_or_equal(self, other: Outcome) -> bool {
        self.compare(other) != Ordering::Greater
    }

    /// The worse of two outcomes
    ///
    /// A running build's provisional outcome only ever moves down the
    /// lattice, so downgrades are expressed as `current.combine(new)`.
    pub fn combine(self, other: Outcome) -> Outcome {
        if other.is_worse_than(self) {
            other
        } else {
            self
        }
    }

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Unstable => "UNSTABLE",
            Outcome::Failure => "FAILURE",
            Outcome::NotBuilt => "NOT_BUILT",
            Outcome::Aborted => "ABORTED",
        }
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .iter()
            .copied()
            .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown outcome: {}", s)))
    }
}
