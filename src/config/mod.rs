//! Configuration management for pugdep
//!
//! Resolution is driven by a small set of options that can come from a
//! `pugdep.toml` file, command-line overrides, or the defaults below.
//!
//! # Configuration File (`pugdep.toml`)
//!
//! ```toml
//! # Number of spaces per nesting level in normalized and rendered output
//! indent-unit = 2
//!
//! # Line separator used in normalized and rendered output: "\n", "\r\n" or "\r"
//! line-separator = "\n"
//!
//! # Attribute values to treat as asset dependencies.
//! # `tag:attr` matches one tag, `:attr` matches any tag.
//! attributes = ["img:src", ":data-src"]
//!
//! # Appended to `extends`/`include` targets that have no extension
//! default-extension = "pug"
//! ```
//!
//! # Validation
//!
//! [`ResolverConfig::validate`] runs before any template is touched and turns
//! the raw settings into a [`ValidatedConfig`]. A malformed attribute pattern
//! fails here, never halfway through a resolution.
//!
//! # Modules
//!
//! - `settings` - The serde-backed [`ResolverConfig`] and its file loading
//! - `attributes` - [`AttributePattern`] parsing and matching

mod attributes;
mod settings;

pub use attributes::AttributePattern;
pub use settings::{CONFIG_FILE_NAME, ResolverConfig, ValidatedConfig};
