//! Archiving Integration Tests
//!
//! - archive: the archiving step and its effect on the build outcome
//! - factories: pluggable artifact managers and their binding
//! - listing: browsing what a build archived

#[path = "../common/mod.rs"]
mod common;

mod listing;
