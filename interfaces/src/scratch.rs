//! Scratch Directory
//!
//! Holds decompressed input for the duration of a job.

use crate::InterfaceError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Working folder removed on cleanup or drop unless kept
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    keep: bool,
    removed: bool,
}

impl ScratchDir {
    /// Create (or reuse) the folder at `path`
    pub fn create(path: impl Into<PathBuf>, keep: bool) -> Result<Self, InterfaceError> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|e| InterfaceError::io(&path, e))?;
        debug!("Scratch folder ready at {}", path.display());
        Ok(Self {
            path,
            keep,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keep(&self) -> bool {
        self.keep
    }

    /// Remove the folder; failures are logged, never returned
    pub fn cleanup(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        if self.keep {
            info!("Keeping extracted files in {}", self.path.display());
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => info!("Removed scratch folder {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove scratch folder {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_folder() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("extracted");
        let mut scratch = ScratchDir::create(&path, false).unwrap();
        fs::write(scratch.path().join("a.csv"), "x").unwrap();
        scratch.cleanup();
        assert!(!path.exists());
        // Second call is a no-op
        scratch.cleanup();
    }

    #[test]
    fn test_drop_removes_folder() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("extracted");
        {
            let _scratch = ScratchDir::create(&path, false).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_keep_leaves_folder() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("extracted");
        drop(ScratchDir::create(&path, true).unwrap());
        assert!(path.exists());
    }
}
