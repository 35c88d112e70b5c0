//! Job engine for runkeep
//!
//! Ties history, storage and artifacts together per job:
//! - [`Job`]: number allocation, concurrency admission, build lifecycle,
//!   locking, deletion
//! - [`RetentionEngine`]: artifact pruning before each build starts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod job;
pub mod retention;

pub use job::{Job, JobServices};
pub use retention::{RetentionEngine, RetentionReport};
