//! Template composition for indentation-based templates.
//!
//! This module turns an entry template that uses `extends`, `include` and
//! `block` into one flat document, and reports the asset files its tag
//! attributes reference.
//!
//! # Pipeline
//!
//! ```text
//! TemplateStore::get ──► read ─► tokenize (validate) ─► normalize
//!                                   ─► extract_dependencies ─► DirectiveParser
//!        ▲                                                        │
//!        │                                                        ▼
//!   Resolver (extends / include / block overrides) ◄──── TemplateRecord
//!        │
//!        ▼
//!   render ─► ResolvedArtifact { content, deps } ─► emit_module (optional)
//! ```
//!
//! # Directives
//!
//! - `extends <path>` at column zero makes the template a child of `<path>`;
//!   only `block` sections after it are used
//! - `include <path>` splices another template, resolved on its own
//! - `block <name>` declares (or, below `extends`, overrides) a named slot;
//!   `block append <name>` / `append <name>` and `block prepend <name>` /
//!   `prepend <name>` add to the slot instead of replacing it
//!
//! Paths are relative to the template containing the directive; the default
//! extension (`.pug`) is appended when a path has none.
//!
//! # Asset dependencies
//!
//! Attribute values selected by the configured patterns (`img:src` by
//! default) are resolved to absolute paths and rewritten in place, so
//! `img(src='./a.png')` in `/proj/views/page.pug` renders as
//! `img(src=/proj/views/a.png)` and `/proj/views/a.png` is reported under
//! `/proj/views/page.pug`.

pub mod artifact;
pub mod extractor;
pub mod lexer;
pub mod module;
pub mod normalize;
pub mod parser;
pub mod renderer;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod resolver_tests;

pub use artifact::{DependencyMap, ResolvedArtifact};
pub use lexer::{PugLexer, Token, Tokenizer};
pub use module::emit_module;
pub use resolver::Resolver;
pub use store::{FileSystem, OsFileSystem, TemplateRecord, TemplateStore};
