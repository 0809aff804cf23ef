//! Per-request scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::WorkerKind;
use crate::error::StorageError;

pub const SCRIPT_FILE_NAME: &str = "script.txt";
pub const OUTPUT_DIR_NAME: &str = "output";

/// Root under which every request gets its own directory.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a unique directory holding the script and, for generation
    /// kinds, an empty output directory.
    pub fn create(&self, kind: WorkerKind, script_text: &str) -> Result<ScratchDir, StorageError> {
        std::fs::create_dir_all(&self.root).map_err(|e| StorageError::CreateDirectory {
            path: self.root.clone(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(kind.scratch_prefix())
            .tempdir_in(&self.root)
            .map_err(|e| StorageError::CreateDirectory {
                path: self.root.clone(),
                source: e,
            })?;

        // From here on `dir` removes itself if anything fails.
        let script_path = dir.path().join(SCRIPT_FILE_NAME);
        std::fs::write(&script_path, script_text).map_err(|e| StorageError::WriteFile {
            path: script_path.clone(),
            source: e,
        })?;

        let output_dir = if kind.is_generation() {
            let output = dir.path().join(OUTPUT_DIR_NAME);
            std::fs::create_dir(&output).map_err(|e| StorageError::CreateDirectory {
                path: output.clone(),
                source: e,
            })?;
            Some(output)
        } else {
            None
        };

        tracing::debug!(path = %dir.path().display(), %kind, "Created scratch directory");

        Ok(ScratchDir {
            dir: Some(dir),
            script_path,
            output_dir,
        })
    }
}

/// A scratch directory exclusively owned by one request.
///
/// Removed by [`ScratchDir::close`], or on drop if never closed.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    script_path: PathBuf,
    output_dir: Option<PathBuf>,
}

impl ScratchDir {
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(|d| d.path())
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Removes the directory. Failures are logged and returned; callers
    /// holding a more important error should keep theirs.
    pub fn close(mut self) -> Result<(), StorageError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        let path = dir.path().to_path_buf();

        match dir.close() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed scratch directory");
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to remove scratch directory");
                Err(StorageError::RemoveDirectory { path, source: e })
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::error!(path = %path.display(), error = %e, "Failed to remove scratch directory");
            }
        }
    }
}
