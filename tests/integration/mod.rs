//! Integration test suite for pugdep
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **composition**: `extends` / `include` / `block` resolution on disk
//! - **dependencies**: asset discovery, rewriting, and module emission
//! - **cache**: record reuse and reload across resolutions
//! - **cli**: the `pugdep` binary end to end

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cache;
mod cli;
mod composition;
mod dependencies;
