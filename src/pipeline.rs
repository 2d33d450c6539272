//! Pipeline Orchestrator.
//!
//! A strictly sequential state machine:
//!
//! ```text
//! GenerateVersion → EnsureFolders → AggregateHeader → DistributeSuperHeader
//!   → DistributeSpecialHeaders → DistributeMacResources → Done
//! ```
//!
//! Each stage runs only if the previous one succeeded.  The first failure
//! moves the machine to `Aborted` and is returned as a [`StageError`];
//! later stages are recorded as not run.
use std::path::{Path, PathBuf};

use crate::config::Layout;
use crate::destinations::{Destination, destinations_for};
use crate::error::{StageError, SyncError};
use crate::logging::{Log, StageStatus};
use crate::operations::FileSystemOps;
use crate::sync::aggregate::TemplateExpander;
use crate::sync::{
    Artifact, DistributionJob, Distributor, FileWriter, JobStats, folders, version,
};
use crate::vcs::SourceControl;

/// States of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Render the version header and write it if it changed.
    GenerateVersion,
    /// Create missing destination folders and the local output folder.
    EnsureFolders,
    /// Expand the super header template.
    AggregateHeader,
    /// Fan the super header out to every platform.
    DistributeSuperHeader,
    /// Fan each special header out to every platform.
    DistributeSpecialHeaders,
    /// Copy resource files to the resource platform only.
    DistributeMacResources,
    /// Every stage succeeded.
    Done,
    /// A stage failed; nothing after it ran.
    Aborted,
}

impl Stage {
    /// Entry state.
    pub const FIRST: Self = Self::GenerateVersion;

    /// Human-readable stage name used in logs, the summary and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GenerateVersion => "Generate version header",
            Self::EnsureFolders => "Ensure folders",
            Self::AggregateHeader => "Aggregate super header",
            Self::DistributeSuperHeader => "Distribute super header",
            Self::DistributeSpecialHeaders => "Distribute special headers",
            Self::DistributeMacResources => "Distribute mac resources",
            Self::Done => "Done",
            Self::Aborted => "Aborted",
        }
    }

    /// State entered after this one succeeds.  Terminal states map to
    /// themselves.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::GenerateVersion => Self::EnsureFolders,
            Self::EnsureFolders => Self::AggregateHeader,
            Self::AggregateHeader => Self::DistributeSuperHeader,
            Self::DistributeSuperHeader => Self::DistributeSpecialHeaders,
            Self::DistributeSpecialHeaders => Self::DistributeMacResources,
            Self::DistributeMacResources | Self::Done => Self::Done,
            Self::Aborted => Self::Aborted,
        }
    }

    /// `true` for [`Stage::Done`] and [`Stage::Aborted`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// The external collaborators a run depends on.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Filesystem used for comparisons, listings and folders.
    pub fs: &'a dyn FileSystemOps,
    /// The only path that overwrites destination files.
    pub writer: &'a dyn FileWriter,
    /// Revision source for the version header.
    pub vcs: &'a dyn SourceControl,
    /// Builds the super header.
    pub expander: &'a dyn TemplateExpander,
    /// Progress and summary sink.
    pub log: &'a dyn Log,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("fs", &self.fs)
            .field("writer", &self.writer)
            .field("vcs", &self.vcs.name())
            .field("expander", &self.expander)
            .finish_non_exhaustive()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Per-stage counters, in execution order.
    pub stages: Vec<(Stage, JobStats)>,
}

impl PipelineReport {
    /// Counters summed over every stage.
    #[must_use]
    pub fn total(&self) -> JobStats {
        let mut total = JobStats::new();
        for (_, stats) in &self.stages {
            total += *stats;
        }
        total
    }
}

/// One configured run over a working directory and an SDK root.
#[derive(Debug)]
pub struct Pipeline<'a> {
    layout: &'a Layout,
    working_dir: PathBuf,
    sdk_root: PathBuf,
    destinations: Vec<Destination>,
    collab: Collaborators<'a>,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    /// Bind `layout` to a working directory and an SDK root.  The
    /// destination list is fixed here, in platform order.
    #[must_use]
    pub fn new(
        layout: &'a Layout,
        working_dir: &Path,
        sdk_root: &Path,
        collab: Collaborators<'a>,
        dry_run: bool,
    ) -> Self {
        Self {
            layout,
            working_dir: working_dir.to_path_buf(),
            sdk_root: sdk_root.to_path_buf(),
            destinations: destinations_for(sdk_root, &layout.platforms, &layout.sdk_subdir),
            collab,
            dry_run,
        }
    }

    /// Drive the state machine from [`Stage::FIRST`] to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage together with its error.
    pub fn run(&self) -> Result<PipelineReport, StageError> {
        let log = self.collab.log;
        let distributor = Distributor::new(
            self.collab.fs,
            self.collab.writer,
            self.collab.log,
            self.dry_run,
        );
        let mut report = PipelineReport { stages: Vec::new() };
        let mut failure = None;
        let mut state = Stage::FIRST;

        while !state.is_terminal() {
            log.stage(state.name());
            match self.run_stage(state, &distributor) {
                Ok(stats) => {
                    let summary = self.describe(state, stats);
                    log.info(&summary);
                    let status = if self.dry_run {
                        StageStatus::DryRun
                    } else {
                        StageStatus::Ok
                    };
                    log.record_stage(state.name(), status, Some(&summary));
                    report.stages.push((state, stats));
                    state = state.next();
                }
                Err(source) => {
                    failure = Some(abort(log, state, source));
                    state = Stage::Aborted;
                }
            }
        }

        failure.map_or(Ok(report), Err)
    }

    fn describe(&self, stage: Stage, stats: JobStats) -> String {
        match stage {
            Stage::EnsureFolders => {
                let verb = if self.dry_run { "would create" } else { "created" };
                format!("{} {verb}, {} present", stats.written, stats.unchanged)
            }
            Stage::AggregateHeader => format!(
                "expanded {}",
                self.layout.super_header.output.display()
            ),
            _ => stats.summary(self.dry_run),
        }
    }

    fn run_stage(&self, stage: Stage, distributor: &Distributor<'_>) -> Result<JobStats, SyncError> {
        match stage {
            Stage::GenerateVersion => version::generate(
                self.collab.vcs,
                distributor,
                &self.working_dir,
                &self.working_dir.join(&self.layout.version_header),
            ),
            Stage::EnsureFolders => self.ensure_folders(),
            Stage::AggregateHeader => {
                let header = &self.layout.super_header;
                self.collab.expander.expand(
                    &self.working_dir.join(&header.template),
                    &self.working_dir.join(&header.output),
                )?;
                Ok(JobStats::new())
            }
            Stage::DistributeSuperHeader => {
                let output = self.working_dir.join(&self.layout.super_header.output);
                let artifact = Artifact::from_source(&output).ok_or_else(|| {
                    SyncError::fs(
                        "resolve super header",
                        &output,
                        std::io::Error::from(std::io::ErrorKind::InvalidInput),
                    )
                })?;
                distributor
                    .run(&DistributionJob::new(&artifact, &self.destinations))
                    .into_result()
            }
            Stage::DistributeSpecialHeaders => self.distribute_special_headers(distributor),
            Stage::DistributeMacResources => self.distribute_resources(distributor),
            Stage::Done | Stage::Aborted => Ok(JobStats::new()),
        }
    }

    /// Create every destination folder plus the local super header output
    /// folder.  The output folder is created even in a dry run because the
    /// aggregator still writes there.
    fn ensure_folders(&self) -> Result<JobStats, SyncError> {
        let fs = self.collab.fs;
        let mut stats = JobStats::new();
        for destination in &self.destinations {
            if fs.exists(&destination.folder) {
                stats.unchanged += 1;
                continue;
            }
            if self.dry_run {
                self.collab
                    .log
                    .dry_run(&format!("would create {}", destination.folder.display()));
            } else {
                folders::ensure(fs, &destination.folder)?;
                self.collab
                    .log
                    .debug(&format!("created {}", destination.folder.display()));
            }
            stats.written += 1;
        }
        if let Some(output_dir) = self
            .working_dir
            .join(&self.layout.super_header.output)
            .parent()
        {
            folders::ensure(fs, output_dir)?;
        }
        Ok(stats)
    }

    fn distribute_special_headers(&self, distributor: &Distributor<'_>) -> Result<JobStats, SyncError> {
        let source_dir = self.working_dir.join(&self.layout.special_header_folder);
        let mut stats = JobStats::new();
        for name in &self.layout.special_headers {
            let artifact = Artifact::new(source_dir.join(name), name);
            self.collab.log.debug(&format!("special header {artifact}"));
            stats += distributor
                .run(&DistributionJob::new(&artifact, &self.destinations))
                .into_result()?;
        }
        Ok(stats)
    }

    fn distribute_resources(&self, distributor: &Distributor<'_>) -> Result<JobStats, SyncError> {
        let resources = &self.layout.resources;
        let folder = self.working_dir.join(&resources.folder);
        let target = [Destination::new(
            &self.sdk_root,
            &resources.platform,
            &self.layout.sdk_subdir,
        )];

        let mut matching: Vec<PathBuf> = self
            .collab
            .fs
            .read_dir(&folder)
            .map_err(|e| SyncError::fs("list", &folder, e))?
            .into_iter()
            .filter(|p| self.collab.fs.is_file(p))
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| has_extension(&n.to_string_lossy(), &resources.extension))
            })
            .collect();
        matching.sort();
        self.collab.log.debug(&format!(
            "{} resource file(s) in {}",
            matching.len(),
            folder.display()
        ));

        let mut stats = JobStats::new();
        for path in &matching {
            let Some(artifact) = Artifact::from_source(path) else {
                continue;
            };
            stats += distributor
                .run(&DistributionJob::new(&artifact, &target))
                .into_result()?;
        }
        Ok(stats)
    }
}

/// Case-insensitive suffix match on `.<extension>`.  An empty extension
/// matches every name.
#[must_use]
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return true;
    }
    let suffix = format!(".{}", extension.to_lowercase());
    name.to_lowercase().ends_with(&suffix)
}


/// Log `source` as the failure of `stage` and mark every later stage as
/// not run.
#[must_use]
pub fn abort(log: &dyn Log, stage: Stage, source: SyncError) -> StageError {
    log.error(&format!("{}: {source}", stage.name()));
    log.record_stage(stage.name(), StageStatus::Failed, Some(&source.to_string()));
    let mut skipped = stage.next();
    while !skipped.is_terminal() {
        log.record_stage(skipped.name(), StageStatus::NotRun, None);
        skipped = skipped.next();
    }
    StageError { stage, source }
}
