//! In-memory filesystem with explicit modification times.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::templating::FileSystem;

#[derive(Debug)]
struct MemoryFile {
    content: String,
    modified: SystemTime,
    reads: usize,
}

/// A [`FileSystem`] held in memory
///
/// Clones share the same files, so a test can keep one handle while the
/// resolver owns another and still edit files or bump their mtimes.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MemoryFile>>>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MemoryFile>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a file with the epoch as its modification time
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.insert_with_mtime(path, content, SystemTime::UNIX_EPOCH);
    }

    /// Add or replace a file with an explicit modification time
    pub fn insert_with_mtime(
        &self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        modified: SystemTime,
    ) {
        self.lock().insert(
            path.into(),
            MemoryFile {
                content: content.into(),
                modified,
                reads: 0,
            },
        );
    }

    /// Change a file's content without touching its modification time
    ///
    /// # Panics
    ///
    /// Panics if the file does not exist.
    pub fn write_keep_mtime(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let mut files = self.lock();
        let file = files.get_mut(path.as_ref()).expect("file exists in memory filesystem");
        file.content = content.into();
    }

    /// Move a file's modification time forward by `by`
    ///
    /// # Panics
    ///
    /// Panics if the file does not exist.
    pub fn touch(&self, path: impl AsRef<Path>, by: Duration) {
        let mut files = self.lock();
        let file = files.get_mut(path.as_ref()).expect("file exists in memory filesystem");
        file.modified += by;
    }

    /// Delete a file
    pub fn remove(&self, path: impl AsRef<Path>) {
        self.lock().remove(path.as_ref());
    }

    /// How many times a file was read
    #[must_use]
    pub fn reads(&self, path: impl AsRef<Path>) -> usize {
        self.lock().get(path.as_ref()).map_or(0, |file| file.reads)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path.display()))
}

impl FileSystem for MemoryFileSystem {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.lock().get(path).map(|file| file.modified).ok_or_else(|| not_found(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut files = self.lock();
        let file = files.get_mut(path).ok_or_else(|| not_found(path))?;
        file.reads += 1;
        Ok(file.content.clone())
    }
}
