//! pugdep - template composition and asset dependency resolver
//!
//! pugdep takes an entry template written in an indentation-based template
//! language (pug) and flattens its `extends` / `include` / `block` graph into
//! a single document. While doing so it finds asset references in tag
//! attributes (`img(src='./logo.png')` by default), rewrites them to absolute
//! paths, and reports which assets each template depends on, so a bundler can
//! `require` them and substitute their public URLs.
//!
//! # Architecture Overview
//!
//! - Templates are loaded into a path-keyed record store that re-reads a file
//!   only when its modification time changes
//! - Each load validates the file with a tokenizer, normalizes indentation and
//!   line endings, rewrites asset attributes, and parses directive lines into
//!   a block tree
//! - The resolver walks `extends` chains, merges block overrides (the template
//!   nearest the entry wins), expands includes, and renders the leaf lines
//!
//! # Core Modules
//!
//! - [`templating`] - Tokenizer, parser, record store, resolver, renderer, and
//!   module emission
//! - [`config`] - `pugdep.toml` settings and attribute patterns
//! - [`core`] - Error type and user-facing error reports
//! - [`cli`] - The `pugdep` command-line interface
//! - [`utils`] - Path normalization and atomic file writes
//!
//! # Example
//!
//! ```rust,no_run
//! use pugdep::{Resolver, ResolverConfig};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ResolverConfig {
//!     attributes: vec!["img:src".into(), "source:src".into()],
//!     ..ResolverConfig::default()
//! };
//! let mut resolver = Resolver::new(&config)?;
//!
//! let artifact = resolver.resolve(Path::new("views/index.pug"))?;
//! println!("{}", artifact.content);
//! for (template, assets) in artifact.deps.iter() {
//!     println!("{}: {} assets", template.display(), assets.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! pugdep resolve views/index.pug
//! pugdep resolve views/index.pug --format module --output dist/index.js
//! pugdep deps views/index.pug --flat
//! pugdep watch views/index.pug --output dist/index.html
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod templating;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::ResolverConfig;
pub use crate::core::PugdepError;
pub use crate::templating::{DependencyMap, ResolvedArtifact, Resolver};
