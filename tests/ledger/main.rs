//! Ledger Integration Tests
//!
//! - config: opening a ledger from TOML
//! - lifecycle: build lifecycle through the facade, job isolation
//! - listeners: deletion and completion observers

#[path = "../common/mod.rs"]
mod common;

mod lifecycle;
mod listeners;
