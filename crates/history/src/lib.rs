//! Build history for runkeep
//!
//! - [`RunRecord`]: one build, its set-once result and lock flag
//! - [`RunHistory`]: a job's builds ordered by number
//! - [`HistorySnapshot`]: frozen view the traversal queries run against
//! - [`ListenerRegistry`]: observers of deleted builds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod history;
pub mod listener;
pub mod record;
pub mod snapshot;
mod traversal;

pub use history::RunHistory;
pub use listener::{ListenerRegistry, RunListener};
pub use record::RunRecord;
pub use snapshot::{HistorySnapshot, RunEntry};
