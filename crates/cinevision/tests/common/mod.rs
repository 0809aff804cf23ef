//! Shared test utilities for cinevision integration tests.
//!
//! - `TestHarness` for an isolated service with its own scratch root
//! - Script fixtures and fake workers

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::TestHarness;
