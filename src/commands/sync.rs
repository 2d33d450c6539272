//! Command: regenerate and distribute headers and resources.
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::VcsKind;
use crate::error::StageError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::pipeline::{self, Collaborators, Pipeline, Stage};
use crate::sync::TrackedFileWriter;
use crate::sync::aggregate::MakeHeader;
use crate::vcs::{self, SourceControl};

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if setup fails, no source-control backend is
/// available, or a pipeline stage fails.  Stage failures carry a
/// [`StageError`](crate::error::StageError) so the caller can recover the
/// exit status.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let version = option_env!("SDKDIST_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("sdkdist {version}"));

    let setup = CommandSetup::init(global, log)?;
    let root = &setup.working_dir;
    let layout = &setup.layout;

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let source_control = detect_backend(layout.vcs, root, Arc::clone(&executor), log)?;
    log.info(&format!("source control: {}", source_control.name()));

    let fs: Arc<dyn FileSystemOps> = Arc::new(SystemFileSystemOps);
    let writer = TrackedFileWriter::new(Arc::clone(&fs), Arc::clone(&source_control));
    let expander = MakeHeader::new(&layout.super_header.tool, root, executor);

    if global.dry_run {
        log.warn("dry run: SDK folders and the version header will not be written");
    }

    let collab = Collaborators {
        fs: &*fs,
        writer: &writer,
        vcs: &*source_control,
        expander: &expander,
        log,
    };
    let result = Pipeline::new(layout, root, &setup.sdk_root, collab, global.dry_run).run();

    log.print_summary();
    let report = result?;
    log.info(&report.total().summary(global.dry_run));
    Ok(())
}

/// Pick the source-control backend.  The version header is the first
/// consumer of revision data, so a missing backend fails that stage.
fn detect_backend(
    kind: VcsKind,
    root: &Path,
    executor: Arc<dyn Executor>,
    log: &dyn Log,
) -> Result<Arc<dyn SourceControl>, StageError> {
    vcs::detect(kind, root, executor).map_err(|source| pipeline::abort(log, Stage::FIRST, source))
}
