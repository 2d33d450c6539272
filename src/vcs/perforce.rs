//! Perforce backend driven through the `p4` command line.
use std::path::Path;
use std::sync::Arc;

use chrono::DateTime;

use super::{RevisionInfo, SourceControl};
use crate::error::SyncError;
use crate::exec::Executor;

/// Perforce command-line client.
pub const P4: &str = "p4";

/// Perforce workspaces.
///
/// Tracked means `p4 fstat` knows a depot file for the path; checkout is
/// `p4 edit`, which opens the file for edit and makes it writable.
#[derive(Debug)]
pub struct PerforceSourceControl {
    executor: Arc<dyn Executor>,
}

impl PerforceSourceControl {
    /// Backend running `p4` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

fn launch_err(e: &anyhow::Error) -> SyncError {
    SyncError::vcs(format!("{e:#}"))
}

/// Parse `p4 -ztag changes -m1` output into revision metadata.
fn parse_ztag_change(stdout: &str) -> Option<RevisionInfo> {
    let field = |name: &str| {
        let prefix = format!("... {name} ");
        stdout
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .map(str::trim)
    };
    let change: u64 = field("change")?.parse().ok()?;
    let seconds: i64 = field("time")?.parse().ok()?;
    Some(RevisionInfo {
        change,
        revision: change.to_string(),
        timestamp: DateTime::from_timestamp(seconds, 0)?,
        author: field("user").unwrap_or("unknown").to_string(),
        branch: field("client").unwrap_or("unknown").to_string(),
    })
}

impl SourceControl for PerforceSourceControl {
    fn name(&self) -> &'static str {
        "perforce"
    }

    fn is_tracked(&self, path: &Path) -> Result<bool, SyncError> {
        let Some(dir) = path.parent().filter(|d| d.is_dir()) else {
            return Ok(false);
        };
        let file = path.to_string_lossy();
        let result = self
            .executor
            .run_in_unchecked(dir, P4, &["fstat", "-T", "depotFile", &file])
            .map_err(|e| launch_err(&e))?;
        Ok(result.success && result.stdout.contains("depotFile"))
    }

    fn checkout(&self, path: &Path) -> Result<(), SyncError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = path.to_string_lossy();
        let result = self
            .executor
            .run_in_unchecked(dir, P4, &["edit", &file])
            .map_err(|e| launch_err(&e))?;
        if result.success {
            return Ok(());
        }
        Err(SyncError::SourceControl {
            message: format!("p4 edit {file} failed: {}", result.stderr.trim()),
            code: result.code,
        })
    }

    fn revision(&self, working_dir: &Path) -> Result<RevisionInfo, SyncError> {
        let spec = format!("{}/...#have", working_dir.display());
        let result = self
            .executor
            .run_in_unchecked(
                working_dir,
                P4,
                &["-ztag", "changes", "-m1", "-s", "submitted", &spec],
            )
            .map_err(|e| launch_err(&e))?;
        if !result.success {
            return Err(SyncError::SourceControl {
                message: format!("p4 changes failed: {}", result.stderr.trim()),
                code: result.code,
            });
        }
        parse_ztag_change(&result.stdout).ok_or_else(|| {
            SyncError::vcs(format!(
                "no submitted change found for {}",
                working_dir.display()
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    const CHANGES_OUTPUT: &str = "... change 48213\n... time 1700000000\n... user rebecca\n... client rebecca-main\n... status submitted\n";

    fn p4(mock: &Arc<MockExecutor>) -> PerforceSourceControl {
        PerforceSourceControl::new(Arc::clone(mock) as Arc<dyn Executor>)
    }

    #[test]
    fn parse_full_record() {
        let info = parse_ztag_change(CHANGES_OUTPUT).unwrap();
        assert_eq!(info.change, 48213);
        assert_eq!(info.revision, "48213");
        assert_eq!(info.author, "rebecca");
        assert_eq!(info.branch, "rebecca-main");
        assert_eq!(info.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn parse_requires_change_and_time() {
        assert!(parse_ztag_change("... change 12\n").is_none());
        assert!(parse_ztag_change("").is_none());
    }

    #[test]
    fn tracked_when_fstat_reports_depot_file() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockExecutor::with_responses(vec![(
            0,
            "... depotFile //sdk/burger.h\n",
        )]));
        assert!(p4(&mock).is_tracked(&dir.path().join("burger.h")).unwrap());
        assert!(mock.calls()[0].starts_with("p4 fstat -T depotFile"));
    }

    #[test]
    fn untracked_when_fstat_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockExecutor::with_responses(vec![(0, "")]));
        assert!(!p4(&mock).is_tracked(&dir.path().join("burger.h")).unwrap());
    }

    #[test]
    fn untracked_without_parent_folder_skips_p4() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockExecutor::default());
        let path = dir.path().join("missing").join("burger.h");
        assert!(!p4(&mock).is_tracked(&path).unwrap());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn checkout_failure_keeps_exit_code() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(4, "")]));
        let err = p4(&mock).checkout(Path::new("/sdk/burger.h")).unwrap_err();
        assert_eq!(err.status(), 4);
        assert_eq!(mock.calls(), vec!["p4 edit /sdk/burger.h"]);
    }

    #[test]
    fn checkout_launch_failure_is_source_control_error() {
        let mock = Arc::new(MockExecutor::launch_failure());
        let err = p4(&mock).checkout(Path::new("/sdk/burger.h")).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::SourceControl);
    }

    #[test]
    fn revision_parses_changes_output() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(0, CHANGES_OUTPUT)]));
        let info = p4(&mock).revision(Path::new("/work")).unwrap();
        assert_eq!(info.change, 48213);
        assert_eq!(
            mock.calls(),
            vec!["p4 -ztag changes -m1 -s submitted /work/...#have"]
        );
    }

    #[test]
    fn revision_without_changes_fails() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(0, "")]));
        assert!(p4(&mock).revision(Path::new("/work")).is_err());
    }
}
