//! Error types for runkeep.
//!
//! There is one canonical error type shared by every crate in the
//! workspace. Errors fall into three families:
//!
//! - configuration errors (`Config`, `InvalidPattern`): surfaced immediately,
//!   never retried
//! - I/O errors (`Io`): logged with context by the caller; best-effort loops
//!   keep going over their remaining items
//! - consistency errors (`Consistency`): an operation would corrupt history
//!   and is refused
//!
//! Absence is not an error. "No previous build" is `None`, "nothing
//! matched" is an empty result.

use crate::types::BuildNumber;
use thiserror::Error;

/// All runkeep errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed include/exclude pattern
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern token
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Operation would violate a history invariant
    #[error("consistency error: {0}")]
    Consistency(String),

    /// No build with this number in the job
    #[error("build #{0} not found")]
    BuildNotFound(BuildNumber),

    /// No job with this name
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job does not allow concurrent builds and one is running
    #[error("job {0} already has a build in progress")]
    JobBusy(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for runkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a consistency error
    pub fn consistency(msg: impl Into<String>) -> Self {
        Error::Consistency(msg.into())
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BuildNotFound(_) | Error::JobNotFound(_))
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidPattern { .. })
    }

    /// Check if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this is a consistency error.
    pub fn is_consistency(&self) -> bool {
        matches!(self, Error::Consistency(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Consistency(_) | Error::Internal(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<globset::Error> for Error {
    fn from(e: globset::Error) -> Self {
        Error::InvalidPattern {
            pattern: e.glob().unwrap_or_default().to_string(),
            reason: e.kind().to_string(),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        let msg = e.to_string();
        match e.into_io_error() {
            Some(io) => Error::Io(io),
            None => Error::Io(std::io::Error::new(std::io::ErrorKind::Other, msg)),
        }
    }
}
