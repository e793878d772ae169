//! Directory abstraction for telescope model trees.
//!
//! A telescope model is described on disk as a directory per hierarchy level:
//! the telescope root, then one sub-directory per station (or sub-array),
//! which may in turn hold sub-directories for its own child stations.
//! Loaders only need to list sub-directories and files at a level and resolve
//! paths within it, which is what [`TelescopeDir`] provides.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while listing a telescope model directory.
#[derive(Debug, Error)]
pub enum DirError {
    #[error("Telescope directory {0:?} does not exist")]
    NotFound(PathBuf),
    #[error("Failed to list telescope directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One level of a telescope model directory tree.
pub trait TelescopeDir: Sized {
    /// Absolute path of this level
    fn path(&self) -> &Path;

    /// Names of the sub-directories at this level, sorted by name.
    ///
    /// The order is plain byte order, not natural order: `station10` sorts
    /// before `station2`. Loaders match sub-directories to child stations in
    /// this order, so station directories should be zero-padded
    /// (`station002`, `station010`).
    fn subdirs(&self) -> Result<Vec<String>, DirError>;

    /// Names of the regular files at this level, sorted by name
    fn files(&self) -> Result<Vec<String>, DirError>;

    /// Descend into a named sub-directory
    fn child(&self, name: &str) -> Self;

    /// Resolve a file name at this level to a full path
    fn file_path(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }
}

/// Filesystem-backed telescope directory.
#[derive(Debug, Clone)]
pub struct FsTelescopeDir {
    root_path: PathBuf,
}

impl FsTelescopeDir {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Open a directory, failing early if it does not exist.
    pub fn open(root_path: impl Into<PathBuf>) -> Result<Self, DirError> {
        let dir = Self::new(root_path);
        if !dir.root_path.is_dir() {
            return Err(DirError::NotFound(dir.root_path));
        }
        Ok(dir)
    }

    fn entries(&self, want_dirs: bool) -> Result<Vec<String>, DirError> {
        let io_err = |source| DirError::Io {
            path: self.root_path.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root_path).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let file_type = entry.file_type().map_err(io_err)?;

            // Symlinks are followed so linked station directories still count
            let is_dir = if file_type.is_symlink() {
                entry.path().is_dir()
            } else {
                file_type.is_dir()
            };

            if is_dir != want_dirs {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

impl TelescopeDir for FsTelescopeDir {
    fn path(&self) -> &Path {
        &self.root_path
    }

    fn subdirs(&self) -> Result<Vec<String>, DirError> {
        self.entries(true)
    }

    fn files(&self) -> Result<Vec<String>, DirError> {
        self.entries(false)
    }

    fn child(&self, name: &str) -> Self {
        Self::new(self.root_path.join(name))
    }
}
