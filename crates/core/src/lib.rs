//! Core types for runkeep
//!
//! This crate defines the vocabulary every other crate builds on:
//! - [`Outcome`]: the fixed, totally ordered build result lattice
//! - [`BuildNumber`]: per-job build identifier
//! - [`KeepPolicy`], [`ArchiveSettings`], [`JobConfig`], [`LedgerConfig`]
//! - [`BuildLog`]: a build's console log
//! - [`ArtifactManager`] / [`ArtifactView`]: pluggable artifact storage capability
//! - [`Error`]: the canonical error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod log;
pub mod outcome;
pub mod types;

pub use artifact::{ArtifactEntry, ArtifactManager, ArtifactView};
pub use config::{ArchiveSettings, JobConfig, KeepPolicy, LedgerConfig};
pub use error::{Error, Result};
pub use log::{BuildLog, LogLevel, LogLine};
pub use outcome::Outcome;
pub use types::{display_name, BuildNumber, Timestamp};
