//! Tracked-File Writer: the only code path that mutates a destination.
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::SyncError;
use crate::operations::FileSystemOps;
use crate::vcs::SourceControl;

/// Overwrites a single destination file.
pub trait FileWriter: fmt::Debug {
    /// Replace `dst` with the contents of `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout or the copy fails.
    fn write(&self, src: &Path, dst: &Path) -> Result<(), SyncError>;

    /// Replace `dst` with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout or the write fails.
    fn write_contents(&self, contents: &[u8], dst: &Path) -> Result<(), SyncError>;
}

/// Source-control aware writer: checks out a tracked destination before
/// overwriting it.
pub struct TrackedFileWriter {
    fs: Arc<dyn FileSystemOps>,
    vcs: Arc<dyn SourceControl>,
}

impl TrackedFileWriter {
    /// Writer over `fs` that consults `vcs` before each overwrite.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystemOps>, vcs: Arc<dyn SourceControl>) -> Self {
        Self { fs, vcs }
    }

    fn prepare(&self, dst: &Path) -> Result<(), SyncError> {
        if self.vcs.is_tracked(dst)? {
            tracing::debug!("checking out {} via {}", dst.display(), self.vcs.name());
            self.vcs.checkout(dst)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TrackedFileWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedFileWriter")
            .field("fs", &self.fs)
            .field("vcs", &self.vcs.name())
            .finish()
    }
}

impl FileWriter for TrackedFileWriter {
    fn write(&self, src: &Path, dst: &Path) -> Result<(), SyncError> {
        self.prepare(dst)?;
        self.fs
            .copy(src, dst)
            .map_err(|e| SyncError::fs("copy to", dst, e))
    }

    fn write_contents(&self, contents: &[u8], dst: &Path) -> Result<(), SyncError> {
        self.prepare(dst)?;
        self.fs
            .write(dst, contents)
            .map_err(|e| SyncError::fs("write", dst, e))
    }
}
