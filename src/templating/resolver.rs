//! Composition resolver.
//!
//! Follows `extends` chains, splices `block` overrides and expands `include`s
//! until only plain lines remain, collecting each visited template's asset
//! dependencies along the way.
//!
//! # Overrides
//!
//! A template whose root contains `extends` contributes no text of its own.
//! Every `block` after the `extends` line becomes an override: its body is
//! resolved first (so nested includes and blocks are expanded) and unwrapped
//! to indent zero. Overrides are then handed up the chain to the parent.
//!
//! When two templates in one chain override the same block, the one closer
//! to the entry template wins. For `page extends section extends layout`, a
//! `content` block in `page` hides the ones in `section` and `layout`.
//!
//! Overrides are applied when the chain reaches a template without `extends`:
//!
//! | Mode | Result |
//! |---|---|
//! | replace | override lines only; the block's own body is not visited |
//! | append | block body, then override lines |
//! | prepend | override lines, then block body |
//!
//! # Includes
//!
//! An included template is resolved on its own with no overrides, rendered,
//! and spliced in as one multi-line text line at the include's indentation.
//!
//! # Cycles
//!
//! Templates currently being resolved are tracked on a stack; re-entering one
//! fails with [`PugdepError::CircularReference`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::artifact::{DependencyMap, ResolvedArtifact};
use super::lexer::{PugLexer, Tokenizer};
use super::parser::{BlockMode, Node, NodeKind};
use super::renderer::{ResolvedLine, render};
use super::store::{FileSystem, OsFileSystem, TemplateRecord, TemplateStore};
use crate::config::{ResolverConfig, ValidatedConfig};
use crate::core::{PugdepError, Result};
use crate::utils::fs::{normalize_path, resolve_against};

/// An inherited override for a named block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBlock {
    /// How the override combines with the block body
    pub mode: BlockMode,
    /// Resolved override lines, relative to indent zero
    pub lines: Vec<ResolvedLine>,
}

/// Overrides by block name
pub type BlockOverrides = HashMap<String, CompiledBlock>;

/// Unrendered result of resolving one template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Leaf lines in document order
    pub lines: Vec<ResolvedLine>,
    /// Dependencies of every template visited
    pub deps: DependencyMap,
}

/// Resolves entry templates against a record store it owns
///
/// The store outlives individual resolutions, so resolving the same entry
/// again only reloads templates whose modification time changed.
///
/// # Examples
///
/// ```rust,no_run
/// use pugdep::{Resolver, ResolverConfig};
/// use std::path::Path;
///
/// # fn main() -> pugdep::core::Result<()> {
/// let mut resolver = Resolver::new(&ResolverConfig::default())?;
/// let artifact = resolver.resolve(Path::new("views/index.pug"))?;
/// println!("{}", artifact.content);
/// for asset in artifact.all_dependencies() {
///     println!("depends on {}", asset.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Resolver<F: FileSystem = OsFileSystem> {
    store: TemplateStore<F>,
}

impl Resolver<OsFileSystem> {
    /// Create a resolver over the real filesystem with the built-in tokenizer.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate; no file is touched before that.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self::with_parts(config.validate()?, OsFileSystem, Arc::new(PugLexer)))
    }
}

impl<F: FileSystem> Resolver<F> {
    /// Create a resolver from explicit collaborators
    pub fn with_parts(config: ValidatedConfig, fs: F, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            store: TemplateStore::new(fs, tokenizer, config),
        }
    }

    /// Validated settings in use
    pub fn config(&self) -> &ValidatedConfig {
        self.store.config()
    }

    /// The record store
    pub fn store(&self) -> &TemplateStore<F> {
        &self.store
    }

    /// The record store, mutably
    pub fn store_mut(&mut self) -> &mut TemplateStore<F> {
        &mut self.store
    }

    /// Resolve and render `entry`.
    ///
    /// Relative entry paths are taken from the current working directory.
    ///
    /// # Errors
    ///
    /// Any missing template, syntax error or reference cycle aborts the whole
    /// resolution.
    pub fn resolve(&mut self, entry: &Path) -> Result<ResolvedArtifact> {
        let entry = absolute_entry(entry)?;
        tracing::debug!("Resolving {}", entry.display());

        let resolved = self.resolve_lines(&entry)?;
        let config = self.store.config();
        let content = render(&resolved.lines, config.indent_unit, &config.line_separator);

        tracing::debug!(
            "Resolved {}: {} templates, {} assets",
            entry.display(),
            resolved.deps.len(),
            resolved.deps.flatten().len()
        );
        Ok(ResolvedArtifact {
            content,
            deps: resolved.deps,
        })
    }

    /// Resolve `entry` (an absolute path) without rendering.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::resolve`].
    pub fn resolve_lines(&mut self, entry: &Path) -> Result<ResolvedTemplate> {
        let mut stack = Vec::new();
        self.resolve_file(entry, &BlockOverrides::new(), &mut stack)
    }

    fn resolve_file(
        &mut self,
        path: &Path,
        overrides: &BlockOverrides,
        stack: &mut Vec<PathBuf>,
    ) -> Result<ResolvedTemplate> {
        let path = self.store.config().with_default_extension(path);
        if stack.contains(&path) {
            let mut chain = stack.clone();
            chain.push(path);
            return Err(PugdepError::CircularReference {
                chain,
            });
        }

        let record = self.store.get(&path)?;
        stack.push(path);
        let result = self.resolve_record(&record, overrides, stack);
        stack.pop();
        result
    }

    fn resolve_record(
        &mut self,
        record: &TemplateRecord,
        overrides: &BlockOverrides,
        stack: &mut Vec<PathBuf>,
    ) -> Result<ResolvedTemplate> {
        let mut deps = DependencyMap::new();
        deps.insert(record.path.clone(), record.dependencies.clone());

        let extends = record.nodes.iter().enumerate().find_map(|(i, node)| match &node.kind {
            NodeKind::Extends {
                target,
            } => Some((i, target)),
            _ => None,
        });

        let Some((index, target)) = extends else {
            let lines =
                self.resolve_nodes(&record.nodes, &record.dirname, overrides, &mut deps, stack)?;
            return Ok(ResolvedTemplate {
                lines,
                deps,
            });
        };

        for node in &record.nodes[..index] {
            tracing::debug!(
                "Ignoring `{}` before `extends` in {}",
                node.statement,
                record.path.display()
            );
        }

        let mut own = BlockOverrides::new();
        for node in &record.nodes[index + 1..] {
            let NodeKind::Block {
                name,
                mode,
                children,
            } = &node.kind
            else {
                tracing::warn!(
                    "Ignoring `{}` in {}: only blocks may follow `extends`",
                    node.statement,
                    record.path.display()
                );
                continue;
            };

            let body = self.resolve_nodes(children, &record.dirname, overrides, &mut deps, stack)?;
            let unwrap = -(level(node) + 1);
            tracing::trace!("Override `{}` ({:?}) from {}", name, mode, record.path.display());
            own.insert(
                name.clone(),
                CompiledBlock {
                    mode: *mode,
                    lines: body.iter().map(|line| line.shifted(unwrap)).collect(),
                },
            );
        }

        // Inherited overrides come from more derived templates and win
        let mut merged = overrides.clone();
        for (name, block) in own {
            merged.entry(name).or_insert(block);
        }

        let parent_path = resolve_against(&record.dirname, Path::new(target));
        let parent = self.resolve_file(&parent_path, &merged, stack)?;
        deps.merge(parent.deps);

        Ok(ResolvedTemplate {
            lines: parent.lines,
            deps,
        })
    }

    fn resolve_nodes(
        &mut self,
        nodes: &[Node],
        dirname: &Path,
        overrides: &BlockOverrides,
        deps: &mut DependencyMap,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Vec<ResolvedLine>> {
        let mut lines = Vec::new();

        for node in nodes {
            let indent = level(node);
            match &node.kind {
                NodeKind::Text => lines.push(ResolvedLine::new(indent, node.statement.clone())),
                NodeKind::Include {
                    target,
                } => {
                    let target = resolve_against(dirname, Path::new(target));
                    tracing::trace!("Including {}", target.display());
                    let included = self.resolve_file(&target, &BlockOverrides::new(), stack)?;
                    deps.merge(included.deps);

                    let config = self.store.config();
                    let content =
                        render(&included.lines, config.indent_unit, &config.line_separator);
                    lines.push(ResolvedLine::new(indent, content));
                }
                NodeKind::Extends {
                    ..
                } => {
                    tracing::warn!("Ignoring nested `{}`", node.statement);
                }
                NodeKind::Block {
                    name,
                    children,
                    ..
                } => match overrides.get(name) {
                    Some(CompiledBlock {
                        mode: BlockMode::Replace,
                        lines: replacement,
                    }) => {
                        lines.extend(replacement.iter().map(|line| line.shifted(indent)));
                    }
                    Some(compiled) => {
                        let body = self.resolve_block_body(children, dirname, overrides, deps, stack)?;
                        let injected = compiled.lines.iter().map(|line| line.shifted(indent));
                        if compiled.mode == BlockMode::Prepend {
                            lines.extend(injected);
                            lines.extend(body);
                        } else {
                            lines.extend(body);
                            lines.extend(injected);
                        }
                    }
                    None => {
                        lines.extend(
                            self.resolve_block_body(children, dirname, overrides, deps, stack)?,
                        );
                    }
                },
            }
        }

        Ok(lines)
    }

    /// A block's own children, lifted one level into the block's place.
    fn resolve_block_body(
        &mut self,
        children: &[Node],
        dirname: &Path,
        overrides: &BlockOverrides,
        deps: &mut DependencyMap,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Vec<ResolvedLine>> {
        let lines = self.resolve_nodes(children, dirname, overrides, deps, stack)?;
        Ok(lines.iter().map(|line| line.shifted(-1)).collect())
    }
}

fn level(node: &Node) -> isize {
    isize::try_from(node.indent).unwrap_or(isize::MAX)
}

fn absolute_entry(entry: &Path) -> Result<PathBuf> {
    if entry.is_absolute() {
        return Ok(normalize_path(entry));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| PugdepError::io("resolving the working directory for", entry, e))?;
    Ok(resolve_against(&cwd, entry))
}
