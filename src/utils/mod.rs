//! Cross-platform utilities
//!
//! # Modules
//!
//! - [`fs`] - Lexical path normalization and atomic output writes

pub mod fs;

pub use fs::{atomic_write, normalize_path, normalize_path_for_storage, resolve_against};
