//! Common test utilities and infrastructure
//!
//! Shared fixtures, helpers and builders used across the tournament test
//! suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{EngineBuilder, TestHelpers};
