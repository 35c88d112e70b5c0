//! Artifact archiving for runkeep
//!
//! - [`StandardArtifactManager`]: files under the build's `archive/` directory
//! - [`ArtifactManagerFactories`]: pluggable chain choosing a build's manager
//! - [`PatternMatcher`] / [`GlobMatcher`]: include/exclude expressions
//! - [`Archiver`]: the archiving step run inside a build
//! - [`artifacts`] / [`artifacts_up_to`]: listing what was archived

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archiver;
pub mod env;
pub mod factory;
pub mod listing;
pub mod manager;
pub mod pattern;

pub use archiver::{ArchiveReport, ArchiveStatus, Archiver};
pub use factory::{ArtifactManagerFactories, ArtifactManagerFactory};
pub use listing::{artifacts, artifacts_up_to};
pub use manager::{FileView, StandardArtifactManager};
pub use pattern::{GlobMatcher, PatternMatcher};
