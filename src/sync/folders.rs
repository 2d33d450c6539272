//! Folder Ensurer.
use std::path::Path;

use crate::error::SyncError;
use crate::operations::FileSystemOps;

/// Make sure `path` exists as a directory, creating missing parents.
///
/// An existing directory is left untouched.
///
/// # Errors
///
/// Returns [`SyncError::Filesystem`] if the directory cannot be created.
pub fn ensure(fs: &dyn FileSystemOps, path: &Path) -> Result<(), SyncError> {
    fs.create_dir_all(path)
        .map_err(|e| SyncError::fs("create folder", path, e))
}
