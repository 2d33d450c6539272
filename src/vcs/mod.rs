//! Source-control collaborators: tracked-file checkout and revision metadata.
//!
//! Destination files may be under version control.  Before the writer
//! overwrites one it asks the backend whether the file is tracked and, if
//! so, checks it out so the overwrite is permitted.  The same backend
//! supplies the revision data rendered into the version header.
pub mod git;
pub mod perforce;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::VcsKind;
use crate::error::SyncError;
use crate::exec::Executor;

pub use git::GitSourceControl;
pub use perforce::PerforceSourceControl;

/// Build metadata describing the checked-out revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    /// Monotonic change number (Perforce changelist, git commit count).
    pub change: u64,
    /// Backend-specific identifier (changelist number, abbreviated hash).
    pub revision: String,
    /// When the revision was committed.
    pub timestamp: DateTime<Utc>,
    /// Who committed it.
    pub author: String,
    /// Branch (git) or client workspace (Perforce).
    pub branch: String,
}

/// A version-control backend.
#[cfg_attr(test, mockall::automock)]
pub trait SourceControl {
    /// Short backend name for log output.
    fn name(&self) -> &'static str;

    /// Whether `path` is managed by this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    fn is_tracked(&self, path: &Path) -> Result<bool, SyncError>;

    /// Make a tracked `path` writable for an overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout is refused or the backend fails.
    fn checkout(&self, path: &Path) -> Result<(), SyncError>;

    /// Metadata for the revision checked out at `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be determined.
    fn revision(&self, working_dir: &Path) -> Result<RevisionInfo, SyncError>;
}

/// Pick the backend for `kind`.
///
/// `Auto` prefers git when `working_dir` is inside a git repository and
/// falls back to Perforce when `p4` is on `PATH`.
///
/// # Errors
///
/// Returns an error if `Auto` finds neither backend.
pub fn detect(
    kind: VcsKind,
    working_dir: &Path,
    executor: Arc<dyn Executor>,
) -> Result<Arc<dyn SourceControl>, SyncError> {
    match kind {
        VcsKind::Git => Ok(Arc::new(GitSourceControl)),
        VcsKind::Perforce => Ok(Arc::new(PerforceSourceControl::new(executor))),
        VcsKind::Auto => {
            if git2::Repository::discover(working_dir).is_ok() {
                Ok(Arc::new(GitSourceControl))
            } else if executor.which(perforce::P4) {
                Ok(Arc::new(PerforceSourceControl::new(executor)))
            } else {
                Err(SyncError::vcs(format!(
                    "no git repository at {} and '{}' is not on PATH",
                    working_dir.display(),
                    perforce::P4
                )))
            }
        }
    }
}
