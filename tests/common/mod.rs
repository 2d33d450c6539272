// Shared helpers for integration tests.
//
// Provides a temp-dir-backed working tree and SDK root plus a fluent
// builder, so each integration test can set up an isolated distribution
// without repeating filesystem boilerplate.  External collaborators are
// replaced by a copying template expander and a fixed revision source.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::expect_used)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use sdkdist_cli::config::Layout;
use sdkdist_cli::error::{StageError, SyncError};
use sdkdist_cli::logging::Logger;
use sdkdist_cli::operations::{FileSystemOps, SystemFileSystemOps};
use sdkdist_cli::pipeline::{Collaborators, Pipeline, PipelineReport};
use sdkdist_cli::sync::TrackedFileWriter;
use sdkdist_cli::sync::aggregate::TemplateExpander;
use sdkdist_cli::vcs::{RevisionInfo, SourceControl};

/// Real filesystem that logs every `copy`/`write` destination.
#[derive(Debug, Default)]
pub struct RecordingFs {
    inner: SystemFileSystemOps,
    writes: Mutex<Vec<PathBuf>>,
}

impl RecordingFs {
    pub fn take_writes(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.writes.lock().expect("writes lock"))
    }

    fn record(&self, path: &Path) {
        self.writes
            .lock()
            .expect("writes lock")
            .push(path.to_path_buf());
    }
}

impl FileSystemOps for RecordingFs {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
    fn file_len(&self, path: &Path) -> io::Result<u64> {
        self.inner.file_len(path)
    }
    fn open(&self, path: &Path) -> io::Result<Box<dyn io::Read>> {
        self.inner.open(path)
    }
    fn copy(&self, src: &Path, dst: &Path) -> io::Result<()> {
        self.inner.copy(src, dst)?;
        self.record(dst);
        Ok(())
    }
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.inner.write(path, contents)?;
        self.record(path);
        Ok(())
    }
}

/// Template expander that copies the template to the output, or fails
/// with a fixed exit status.
#[derive(Debug, Default)]
pub struct CopyExpander {
    pub fail_with: Option<i32>,
}

impl TemplateExpander for CopyExpander {
    fn expand(&self, template: &Path, output: &Path) -> Result<(), SyncError> {
        if let Some(code) = self.fail_with {
            return Err(SyncError::ProcessStatus {
                program: "makeheader".to_string(),
                code,
            });
        }
        std::fs::copy(template, output)
            .map(|_| ())
            .map_err(|e| SyncError::fs("expand into", output, e))
    }
}

/// Source control stand-in: nothing is tracked, the revision never changes.
#[derive(Debug, Default)]
pub struct FixedRevision;

impl SourceControl for FixedRevision {
    fn name(&self) -> &'static str {
        "fixed"
    }
    fn is_tracked(&self, _path: &Path) -> Result<bool, SyncError> {
        Ok(false)
    }
    fn checkout(&self, _path: &Path) -> Result<(), SyncError> {
        Ok(())
    }
    fn revision(&self, _working_dir: &Path) -> Result<RevisionInfo, SyncError> {
        Ok(RevisionInfo {
            change: 1024,
            revision: "1024".to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            author: "builder".to_string(),
            branch: "main".to_string(),
        })
    }
}

/// An isolated working tree and SDK root.
pub struct Fixture {
    pub work: tempfile::TempDir,
    pub sdks: tempfile::TempDir,
    pub layout: Layout,
    pub fs: Arc<RecordingFs>,
    pub expander: CopyExpander,
}

impl Fixture {
    pub fn work_path(&self) -> &Path {
        self.work.path()
    }

    /// `<sdk root>/<platform>/burgerlib/<name>`.
    pub fn deployed(&self, platform: &str, name: &str) -> PathBuf {
        self.sdks
            .path()
            .join(platform)
            .join(&self.layout.sdk_subdir)
            .join(name)
    }

    /// Overwrite a file in the working tree.
    pub fn write_source(&self, relative: &str, content: &str) {
        let path = self.work.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(path, content).expect("write source file");
    }

    /// Run the pipeline once with `vcs` and return the paths written.
    pub fn sync_with(
        &self,
        vcs: Arc<dyn SourceControl>,
        dry_run: bool,
    ) -> Result<(PipelineReport, Vec<PathBuf>), (StageError, Vec<PathBuf>)> {
        let writer = TrackedFileWriter::new(
            Arc::clone(&self.fs) as Arc<dyn FileSystemOps>,
            Arc::clone(&vcs),
        );
        let log = Logger::new("test");
        let collab = Collaborators {
            fs: &*self.fs,
            writer: &writer,
            vcs: &*vcs,
            expander: &self.expander,
            log: &log,
        };
        let result = Pipeline::new(
            &self.layout,
            self.work.path(),
            self.sdks.path(),
            collab,
            dry_run,
        )
        .run();
        let writes = self.fs.take_writes();
        match result {
            Ok(report) => Ok((report, writes)),
            Err(err) => Err((err, writes)),
        }
    }

    /// Run the pipeline once with [`FixedRevision`].
    pub fn sync(&self) -> Result<(PipelineReport, Vec<PathBuf>), (StageError, Vec<PathBuf>)> {
        self.sync_with(Arc::new(FixedRevision), false)
    }

    /// Writes that landed under the SDK root.
    pub fn sdk_writes(&self, writes: &[PathBuf]) -> Vec<PathBuf> {
        writes
            .iter()
            .filter(|p| p.starts_with(self.sdks.path()))
            .cloned()
            .collect()
    }
}

/// Fluent builder for [`Fixture`].
pub struct FixtureBuilder {
    platforms: Vec<String>,
    super_header: String,
    special_headers: Vec<(String, String)>,
    resources: Vec<(String, String)>,
    fail_with: Option<i32>,
}

impl FixtureBuilder {
    /// Three platforms, a super header template of `"X"`, no special
    /// headers and no resources.
    pub fn new() -> Self {
        Self {
            platforms: vec!["windows".into(), "linux".into(), "mac".into()],
            super_header: "X".to_string(),
            special_headers: Vec::new(),
            resources: Vec::new(),
            fail_with: None,
        }
    }

    pub fn platforms(mut self, platforms: &[&str]) -> Self {
        self.platforms = platforms.iter().map(ToString::to_string).collect();
        self
    }

    pub fn super_header(mut self, content: &str) -> Self {
        self.super_header = content.to_string();
        self
    }

    pub fn special_header(mut self, name: &str, content: &str) -> Self {
        self.special_headers.push((name.into(), content.into()));
        self
    }

    pub fn resource(mut self, name: &str, content: &str) -> Self {
        self.resources.push((name.into(), content.into()));
        self
    }

    /// Make the template expander exit with `code`.
    pub fn failing_expander(mut self, code: i32) -> Self {
        self.fail_with = Some(code);
        self
    }

    pub fn build(self) -> Fixture {
        let work = tempfile::tempdir().expect("create work dir");
        let sdks = tempfile::tempdir().expect("create sdk dir");
        let layout = Layout {
            platforms: self.platforms,
            special_headers: self.special_headers.iter().map(|(n, _)| n.clone()).collect(),
            ..Layout::default()
        };

        let fixture = Fixture {
            work,
            sdks,
            fs: Arc::new(RecordingFs::default()),
            expander: CopyExpander {
                fail_with: self.fail_with,
            },
            layout,
        };
        fixture.write_source("source/templateburgerbase.h", &self.super_header);
        std::fs::create_dir_all(fixture.work.path().join("source/mac")).expect("create mac dir");
        for (name, content) in &self.special_headers {
            fixture.write_source(&format!("source/{name}"), content);
        }
        for (name, content) in &self.resources {
            fixture.write_source(&format!("source/mac/{name}"), content);
        }
        fixture
    }
}
