//! Template record store.
//!
//! Each template file is loaded once into a [`TemplateRecord`] and kept until
//! its modification time changes. Loading reads the file, validates it with
//! the tokenizer, normalizes indentation and line separators, extracts asset
//! dependencies, and parses the directive tree. A reload redoes all of it and
//! swaps the record wholesale; records are never patched in place.
//!
//! Filesystem access goes through the [`FileSystem`] trait so tests can drive
//! modification times directly.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::extractor::extract_dependencies;
use super::lexer::{LexError, Token, Tokenizer};
use super::normalize::normalize;
use super::parser::{DirectiveParser, Node};
use crate::config::ValidatedConfig;
use crate::core::{PugdepError, Result};

/// Filesystem primitives the store needs
pub trait FileSystem: Send + Sync {
    /// Modification time of `path`
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Cached parse state of one template file
#[derive(Debug, Clone)]
pub struct TemplateRecord {
    /// Absolute path, default extension included
    pub path: PathBuf,
    /// Directory relative references are resolved against
    pub dirname: PathBuf,
    /// Modification time observed when loaded
    pub modified: SystemTime,
    /// Source after indent and line separator normalization
    pub source: String,
    /// Tokens of the normalized source
    pub tokens: Vec<Token>,
    /// Normalized source with asset attribute values made absolute
    pub content: String,
    /// Root-level directive nodes of `content`
    pub nodes: Vec<Node>,
    /// Absolute asset paths referenced by this file, first-seen order
    pub dependencies: Vec<PathBuf>,
}

/// Path-keyed cache of [`TemplateRecord`]s with mtime invalidation
pub struct TemplateStore<F: FileSystem> {
    fs: F,
    tokenizer: Arc<dyn Tokenizer>,
    config: ValidatedConfig,
    parser: DirectiveParser,
    records: HashMap<PathBuf, Arc<TemplateRecord>>,
    hits: usize,
    loads: usize,
}

impl<F: FileSystem> TemplateStore<F> {
    /// Create an empty store
    pub fn new(fs: F, tokenizer: Arc<dyn Tokenizer>, config: ValidatedConfig) -> Self {
        let parser = DirectiveParser::new(config.indent_unit, config.line_separator.clone());
        Self {
            fs,
            tokenizer,
            config,
            parser,
            records: HashMap::new(),
            hits: 0,
            loads: 0,
        }
    }

    /// Validated settings the store normalizes with
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Record for `path`, loading or reloading it when needed.
    ///
    /// The default extension is appended when `path` has none. A fresh stat is
    /// taken on every call; the cached record is returned only if the
    /// modification time is unchanged.
    ///
    /// # Errors
    ///
    /// - [`PugdepError::FileNotFound`] if the file does not exist
    /// - [`PugdepError::Syntax`] if the tokenizer rejects it
    /// - [`PugdepError::Io`] for any other read failure
    pub fn get(&mut self, path: &Path) -> Result<Arc<TemplateRecord>> {
        let path = self.config.with_default_extension(path);
        let modified = self.fs.modified(&path).map_err(|e| PugdepError::io("reading", &path, e))?;

        if let Some(record) = self.records.get(&path) {
            if record.modified == modified {
                self.hits += 1;
                tracing::trace!("Using cached record for {}", path.display());
                return Ok(Arc::clone(record));
            }
            tracing::debug!("{} changed on disk, reloading", path.display());
        }

        let record = Arc::new(self.load(&path, modified)?);
        self.records.insert(path, Arc::clone(&record));
        Ok(record)
    }

    /// Drop the cached record for `path` if its modification time changed.
    ///
    /// Returns whether a record was dropped. Uncached paths are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached file can no longer be stat'ed; its record
    /// is dropped first.
    pub fn invalidate_if_stale(&mut self, path: &Path) -> Result<bool> {
        let path = self.config.with_default_extension(path);
        let Some(record) = self.records.get(&path) else {
            return Ok(false);
        };

        match self.fs.modified(&path) {
            Ok(modified) if modified == record.modified => Ok(false),
            Ok(_) => {
                self.records.remove(&path);
                Ok(true)
            }
            Err(e) => {
                self.records.remove(&path);
                Err(PugdepError::io("reading", path, e))
            }
        }
    }

    /// Whether `path` would be (re)loaded by the next [`TemplateStore::get`].
    ///
    /// Paths that are not cached or cannot be stat'ed count as stale.
    pub fn is_stale(&self, path: &Path) -> bool {
        let path = self.config.with_default_extension(path);
        match (self.records.get(&path), self.fs.modified(&path)) {
            (Some(record), Ok(modified)) => record.modified != modified,
            _ => true,
        }
    }

    /// Whether a record for `path` is cached
    pub fn contains(&self, path: &Path) -> bool {
        self.records.contains_key(&self.config.with_default_extension(path))
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record is cached
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(cache hits, file loads)` since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.loads)
    }

    /// Forget every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn load(&mut self, path: &Path, modified: SystemTime) -> Result<TemplateRecord> {
        tracing::debug!("Loading template {}", path.display());
        self.loads += 1;

        let raw = self.fs.read_to_string(path).map_err(|e| PugdepError::io("reading", path, e))?;
        self.tokenizer.tokenize(&raw).map_err(|e| syntax_error(path, e))?;

        let source = normalize(&raw, self.config.indent_unit, &self.config.line_separator);
        let tokens = self.tokenizer.tokenize(&source).map_err(|e| syntax_error(path, e))?;

        let dirname = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let extraction = extract_dependencies(&source, &tokens, &dirname, &self.config);
        let nodes = self.parser.parse(&extraction.content);

        tracing::debug!(
            "Parsed {}: {} root nodes, {} asset dependencies",
            path.display(),
            nodes.len(),
            extraction.dependencies.len()
        );

        Ok(TemplateRecord {
            path: path.to_path_buf(),
            dirname,
            modified,
            source,
            tokens,
            content: extraction.content,
            nodes,
            dependencies: extraction.dependencies,
        })
    }
}

impl<F: FileSystem> std::fmt::Debug for TemplateStore<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore")
            .field("records", &self.records.keys().collect::<Vec<_>>())
            .field("hits", &self.hits)
            .field("loads", &self.loads)
            .finish_non_exhaustive()
    }
}

fn syntax_error(path: &Path, error: LexError) -> PugdepError {
    PugdepError::Syntax {
        path: path.to_path_buf(),
        line: error.line,
        message: error.message,
    }
}
