//! Version Header Generator.
//!
//! The header is rendered fresh every run from the revision metadata of the
//! working directory.  The rendering uses the revision's own timestamp, so
//! its bytes only change when the revision does, and it is routed through
//! the same compare-then-write path as every other artifact.
use std::fmt::Write as _;
use std::path::Path;

use super::{Distributor, JobStats};
use crate::error::SyncError;
use crate::vcs::{RevisionInfo, SourceControl};

/// Escape `value` for a C string literal.
fn c_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render the header text for `info`.
#[must_use]
pub fn render(info: &RevisionInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by sdkdist. Do not edit.");
    let _ = writeln!(out, "#ifndef __VERSION_H__");
    let _ = writeln!(out, "#define __VERSION_H__");
    let _ = writeln!(out, "#define BUILD_CHANGELIST {}", info.change);
    let _ = writeln!(out, "#define BUILD_REVISION {}", c_string(&info.revision));
    let _ = writeln!(
        out,
        "#define BUILD_DATE {}",
        c_string(&info.timestamp.format("%Y-%m-%d").to_string())
    );
    let _ = writeln!(
        out,
        "#define BUILD_TIME {}",
        c_string(&info.timestamp.format("%H:%M:%S").to_string())
    );
    let _ = writeln!(out, "#define BUILD_AUTHOR {}", c_string(&info.author));
    let _ = writeln!(out, "#define BUILD_BRANCH {}", c_string(&info.branch));
    let _ = writeln!(out, "#endif");
    out
}

/// Query `vcs` for the revision at `working_dir` and sync the rendered
/// header to `output`.
///
/// # Errors
///
/// Returns an error if the revision query fails (nothing is written) or
/// the header cannot be written.
pub fn generate(
    vcs: &dyn SourceControl,
    distributor: &Distributor<'_>,
    working_dir: &Path,
    output: &Path,
) -> Result<JobStats, SyncError> {
    let info = vcs.revision(working_dir)?;
    tracing::debug!(
        "revision {} ({}) by {} on {}",
        info.revision,
        info.change,
        info.author,
        info.branch
    );
    distributor.sync_contents(render(&info).as_bytes(), output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::operations::MockFileSystemOps;
    use crate::sync::TrackedFileWriter;
    use crate::vcs::MockSourceControl;
    use chrono::DateTime;
    use std::sync::Arc;

    fn info() -> RevisionInfo {
        RevisionInfo {
            change: 48213,
            revision: "48213".to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            author: "rebecca".to_string(),
            branch: "rebecca-main".to_string(),
        }
    }

    #[test]
    fn render_snapshot() {
        insta::assert_snapshot!(render(&info()), @r#"
        // Generated by sdkdist. Do not edit.
        #ifndef __VERSION_H__
        #define __VERSION_H__
        #define BUILD_CHANGELIST 48213
        #define BUILD_REVISION "48213"
        #define BUILD_DATE "2023-11-14"
        #define BUILD_TIME "22:13:20"
        #define BUILD_AUTHOR "rebecca"
        #define BUILD_BRANCH "rebecca-main"
        #endif
        "#);
    }

    #[test]
    fn render_escapes_quotes_and_backslashes() {
        let mut info = info();
        info.branch = r#"feature\"x""#.to_string();
        let text = render(&info);
        assert!(
            text.contains(r#"#define BUILD_BRANCH "feature\\\"x\"""#),
            "got: {text}"
        );
    }

    #[test]
    fn render_is_stable_for_same_revision() {
        assert_eq!(render(&info()), render(&info()));
    }

    fn vcs_with(result: Result<RevisionInfo, SyncError>) -> MockSourceControl {
        let mut vcs = MockSourceControl::new();
        let mut result = Some(result);
        vcs.expect_revision()
            .times(1)
            .returning(move |_| result.take().unwrap_or_else(|| Err(SyncError::vcs("again"))));
        vcs
    }

    fn untracked() -> MockSourceControl {
        let mut vcs = MockSourceControl::new();
        vcs.expect_is_tracked().returning(|_| Ok(false));
        vcs
    }

    #[test]
    fn generate_writes_new_header() {
        let fs = Arc::new(MockFileSystemOps::new());
        let writer = TrackedFileWriter::new(fs.clone(), Arc::new(untracked()));
        let query = vcs_with(Ok(info()));
        let log = Logger::new("test");
        let distributor = Distributor::new(&*fs, &writer, &log, false);
        let out = Path::new("/work/source/version.h");

        let stats = generate(&query, &distributor, Path::new("/work"), out).unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(fs.contents(out).unwrap(), render(&info()).into_bytes());
    }

    #[test]
    fn unchanged_revision_writes_nothing() {
        let out = Path::new("/work/source/version.h");
        let fs = Arc::new(MockFileSystemOps::new().with_file(out, render(&info())));
        let writer = TrackedFileWriter::new(fs.clone(), Arc::new(MockSourceControl::new()));
        let query = vcs_with(Ok(info()));
        let log = Logger::new("test");
        let distributor = Distributor::new(&*fs, &writer, &log, false);

        let stats = generate(&query, &distributor, Path::new("/work"), out).unwrap();
        assert_eq!(stats.unchanged, 1);
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn revision_failure_writes_nothing() {
        let fs = Arc::new(MockFileSystemOps::new());
        let writer = TrackedFileWriter::new(fs.clone(), Arc::new(MockSourceControl::new()));
        let query = vcs_with(Err(SyncError::vcs("no repository")));
        let log = Logger::new("test");
        let distributor = Distributor::new(&*fs, &writer, &log, false);

        let err = generate(
            &query,
            &distributor,
            Path::new("/work"),
            Path::new("/work/source/version.h"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no repository"));
        assert!(fs.writes().is_empty());
    }
}
