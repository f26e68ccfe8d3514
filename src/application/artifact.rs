//! Local archive ownership
//!
//! The archive path is claimed before anything is written to it and released
//! exactly once, either explicitly or when the guard drops.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ArchiveArtifact {
    path: PathBuf,
    released: bool,
}

impl ArchiveArtifact {
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the archive if it exists. Returns `true` when a file was
    /// removed; later calls do nothing.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "archive removed");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove archive");
                false
            }
        }
    }
}

impl Drop for ArchiveArtifact {
    fn drop(&mut self) {
        self.release();
    }
}
