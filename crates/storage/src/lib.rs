//! Storage layer for runkeep
//!
//! This crate owns the on-disk representation of jobs and builds:
//! - JobDir / BuildDir: directory layout keyed by build number
//! - BuildFile: the `build.json` record, written atomically
//! - Legacy timestamp-named build directories
//! - Console log file resolution

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod layout;
pub mod record;

pub use layout::{parse_timestamp_dir_name, remove_dir_if_exists, BuildDir, JobDir, StoredBuild};
pub use record::{BuildFile, RECORD_FILE_NAME};
