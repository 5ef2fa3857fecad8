//! Common test utilities for pugdep integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory with a `views/` template tree
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
}

impl TestProject {
    /// Create an empty project
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root)?;
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path inside the project
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read a file
    pub fn read(&self, relative: &str) -> Result<String> {
        fs::read_to_string(self.path(relative)).with_context(|| format!("Failed to read {relative}"))
    }

    /// A site with a layout, a partial, and a page using both
    pub fn with_site() -> Result<Self> {
        let project = Self::new()?;
        project.write(
            "views/layout.pug",
            "doctype html\nhtml\n  head\n    block head\n      title Site\n  body\n    include partials/header\n    block content\n    block scripts\n      script(src='/js/app.js')",
        )?;
        project.write("views/partials/header.pug", "header\n  img(src='../../assets/logo.png')")?;
        project.write(
            "views/index.pug",
            "extends layout\nblock content\n  h1 Welcome\n  img(src='./img/hero.jpg')\nappend scripts\n  script(src='/js/index.js')",
        )?;
        Ok(project)
    }

    /// The `pugdep` binary, run from the project root
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pugdep").expect("pugdep binary is built");
        cmd.current_dir(&self.root).env("NO_COLOR", "1").env_remove("PUGDEP_CONFIG");
        cmd
    }
}
