//! Git backend built on `git2`.
use std::fs::Permissions;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use git2::Repository;

use super::{RevisionInfo, SourceControl};
use crate::error::SyncError;

/// Git working trees.
///
/// A file counts as tracked when it is in the index of the repository that
/// contains it.  Git never locks files, so checkout only clears a read-only
/// bit left behind by other tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitSourceControl;

fn git_err(action: &'static str) -> impl FnOnce(git2::Error) -> SyncError {
    move |e| SyncError::vcs(format!("{action}: {}", e.message()))
}

/// Open the repository containing `path` and return `path` relative to its
/// working tree.  `None` when `path` is not inside any working tree.
fn open_containing(path: &Path) -> Option<(Repository, PathBuf)> {
    let dir = dunce::canonicalize(path.parent()?).ok()?;
    let repo = Repository::discover(&dir).ok()?;
    let workdir = dunce::canonicalize(repo.workdir()?).ok()?;
    let relative = dir
        .join(path.file_name()?)
        .strip_prefix(&workdir)
        .ok()?
        .to_path_buf();
    Some((repo, relative))
}

#[cfg(unix)]
fn make_writable(perms: &mut Permissions) {
    use std::os::unix::fs::PermissionsExt as _;
    perms.set_mode(perms.mode() | 0o200);
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(perms: &mut Permissions) {
    perms.set_readonly(false);
}

impl SourceControl for GitSourceControl {
    fn name(&self) -> &'static str {
        "git"
    }

    fn is_tracked(&self, path: &Path) -> Result<bool, SyncError> {
        let Some((repo, relative)) = open_containing(path) else {
            return Ok(false);
        };
        let index = repo.index().map_err(git_err("read index"))?;
        Ok(index.get_path(&relative, 0).is_some())
    }

    fn checkout(&self, path: &Path) -> Result<(), SyncError> {
        let Ok(meta) = std::fs::metadata(path) else {
            return Ok(());
        };
        let mut perms = meta.permissions();
        if !perms.readonly() {
            return Ok(());
        }
        make_writable(&mut perms);
        std::fs::set_permissions(path, perms).map_err(|e| SyncError::SourceControl {
            message: format!("make {} writable: {e}", path.display()),
            code: e.raw_os_error(),
        })
    }

    fn revision(&self, working_dir: &Path) -> Result<RevisionInfo, SyncError> {
        let repo = Repository::discover(working_dir).map_err(git_err("open repository"))?;
        let head = repo.head().map_err(git_err("resolve HEAD"))?;
        let commit = head.peel_to_commit().map_err(git_err("read HEAD commit"))?;

        let mut walk = repo.revwalk().map_err(git_err("walk history"))?;
        walk.push(commit.id()).map_err(git_err("walk history"))?;
        let change = walk.count() as u64;

        let seconds = commit.time().seconds();
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| SyncError::vcs(format!("commit time out of range: {seconds}")))?;

        let revision = commit
            .as_object()
            .short_id()
            .ok()
            .and_then(|buf| buf.as_str().map(str::to_string))
            .unwrap_or_else(|| commit.id().to_string());

        Ok(RevisionInfo {
            change,
            revision,
            timestamp,
            author: commit.author().name().unwrap_or("unknown").to_string(),
            branch: head.shorthand().unwrap_or("HEAD").to_string(),
        })
    }
}
