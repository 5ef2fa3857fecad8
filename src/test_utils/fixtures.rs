//! Template trees on disk for tests

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ResolverConfig;
use crate::templating::Resolver;

/// A temporary directory of templates
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct TemplateFixture {
    dir: TempDir,
}

impl TemplateFixture {
    /// Create an empty fixture directory
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self {
            dir,
        })
    }

    /// Root directory of the fixture
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the fixture
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file, creating parent directories, and return its absolute path
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Resolver with default settings
    pub fn resolver(&self) -> Result<Resolver> {
        self.resolver_with(&ResolverConfig::default())
    }

    /// Resolver with the given settings
    pub fn resolver_with(&self, config: &ResolverConfig) -> Result<Resolver> {
        Ok(Resolver::new(config)?)
    }
}
