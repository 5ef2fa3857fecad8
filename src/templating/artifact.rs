//! Resolution output: rendered content plus per-template asset dependencies.

use serde::ser::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Asset dependencies keyed by the template that referenced them
///
/// Entries keep the order in which templates were visited. Each template has
/// at most one entry; inserting a template again keeps the first entry.
/// Serializes as a JSON object of path to path list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<(PathBuf, Vec<PathBuf>)>,
}

impl DependencyMap {
    /// Create an empty map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record `dependencies` for `template` unless it already has an entry.
    ///
    /// Returns whether the entry was added.
    pub fn insert(&mut self, template: PathBuf, dependencies: Vec<PathBuf>) -> bool {
        if self.contains(&template) {
            return false;
        }
        self.entries.push((template, dependencies));
        true
    }

    /// Add every entry of `other` whose template is not present yet
    pub fn merge(&mut self, other: Self) {
        for (template, dependencies) in other.entries {
            self.insert(template, dependencies);
        }
    }

    /// Dependencies recorded for `template`
    #[must_use]
    pub fn get(&self, template: &Path) -> Option<&[PathBuf]> {
        self.entries.iter().find(|(t, _)| t == template).map(|(_, deps)| deps.as_slice())
    }

    /// Whether `template` has an entry
    #[must_use]
    pub fn contains(&self, template: &Path) -> bool {
        self.entries.iter().any(|(t, _)| t == template)
    }

    /// Number of templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no template was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(template, dependencies)` in visit order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[PathBuf])> {
        self.entries.iter().map(|(t, deps)| (t.as_path(), deps.as_slice()))
    }

    /// Templates in visit order
    pub fn templates(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(t, _)| t.as_path())
    }

    /// Every asset path once, in first-seen order
    #[must_use]
    pub fn flatten(&self) -> Vec<PathBuf> {
        let mut flat: Vec<PathBuf> = Vec::new();
        for dep in self.entries.iter().flat_map(|(_, deps)| deps) {
            if !flat.contains(dep) {
                flat.push(dep.clone());
            }
        }
        flat
    }
}

impl Serialize for DependencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(t, deps)| (t, deps)))
    }
}

/// Output of resolving one entry template
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedArtifact {
    /// Rendered document, free of composition directives
    pub content: String,
    /// One entry per template file visited
    pub deps: DependencyMap,
}

impl ResolvedArtifact {
    /// All asset paths once, in first-seen order
    #[must_use]
    pub fn all_dependencies(&self) -> Vec<PathBuf> {
        self.deps.flatten()
    }
}
