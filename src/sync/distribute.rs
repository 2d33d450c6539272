//! Selective Distributor.
use std::fmt;
use std::io;
use std::path::Path;

use super::compare::{content_matches, files_equal};
use super::writer::FileWriter;
use super::{DistributionJob, JobStats, JobStatus};
use crate::error::SyncError;
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// Pushes artifacts to destinations, writing only where content differs.
///
/// In dry-run mode every comparison still runs but nothing is written;
/// destinations that would change are logged and counted as written.
pub struct Distributor<'a> {
    fs: &'a dyn FileSystemOps,
    writer: &'a dyn FileWriter,
    log: &'a dyn Log,
    dry_run: bool,
}

impl fmt::Debug for Distributor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Distributor")
            .field("fs", &self.fs)
            .field("writer", &self.writer)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Distributor<'a> {
    /// Distributor writing through `writer`; `dry_run` suppresses writes.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystemOps,
        writer: &'a dyn FileWriter,
        log: &'a dyn Log,
        dry_run: bool,
    ) -> Self {
        Self {
            fs,
            writer,
            log,
            dry_run,
        }
    }

    /// Run one job: visit destinations in order and stop at the first
    /// failed write.  Destinations already written stay written.
    pub fn run(&self, job: &DistributionJob<'_>) -> JobStatus {
        let artifact = job.artifact;
        let mut stats = JobStats::new();
        for (index, destination) in job.destinations.iter().enumerate() {
            let dst = destination.file(&artifact.filename);
            if files_equal(self.fs, &artifact.source, &dst) {
                self.log.debug(&format!("ok: {}", dst.display()));
                stats.unchanged += 1;
                continue;
            }
            let outcome = if self.dry_run {
                self.readable(&artifact.source).map(|()| {
                    self.log.dry_run(&format!("would update {}", dst.display()));
                })
            } else {
                self.writer.write(&artifact.source, &dst)
            };
            if let Err(error) = outcome {
                self.log.error(&format!(
                    "{artifact} -> {}: {error}",
                    destination.platform
                ));
                return JobStatus::Failed {
                    index,
                    stats,
                    error,
                };
            }
            if !self.dry_run {
                self.log.debug(&format!("updated {}", dst.display()));
            }
            stats.written += 1;
        }
        JobStatus::Succeeded(stats)
    }

    /// A dry run never reaches the writer, so check up front that the copy
    /// it would make has a source to read.
    fn readable(&self, source: &Path) -> Result<(), SyncError> {
        if !self.fs.is_file(source) {
            return Err(SyncError::fs(
                "read",
                source,
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            ));
        }
        self.fs
            .open(source)
            .map(drop)
            .map_err(|e| SyncError::fs("read", source, e))
    }

    /// Make `dst` hold exactly `contents`, writing only if it differs.
    ///
    /// # Errors
    ///
    /// Returns the writer's error if the write fails.
    pub fn sync_contents(&self, contents: &[u8], dst: &Path) -> Result<JobStats, SyncError> {
        if content_matches(self.fs, contents, dst) {
            self.log.debug(&format!("ok: {}", dst.display()));
            return Ok(JobStats {
                written: 0,
                unchanged: 1,
            });
        }
        if self.dry_run {
            self.log.dry_run(&format!("would update {}", dst.display()));
        } else {
            self.writer.write_contents(contents, dst)?;
            self.log.debug(&format!("updated {}", dst.display()));
        }
        Ok(JobStats {
            written: 1,
            unchanged: 0,
        })
    }
}
