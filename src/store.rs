//! Flat on-disk storage for generated images.
//!
//! One directory, no subdirectories, no index. Writers call
//! [`QrStore::ensure_dir`] before every write; it is idempotent and safe to
//! race against other writers because `create_dir_all` treats an existing
//! directory as success.

use crate::naming;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct QrStore {
    root: PathBuf,
}

impl QrStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Create the storage directory if it does not exist yet.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Write `bytes` under `filename`, creating the directory if needed.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Stored image filenames in byte-lexicographic order.
    ///
    /// Non-recursive. Only names ending in `.png` (any case) are returned.
    /// Ordering is purely textual: `batch-10-…` sorts before `batch-2-…`.
    pub fn list_images(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| naming::is_image_name(name))
            .collect();
        names.sort();
        Ok(names)
    }
}
