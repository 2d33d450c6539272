//! The change-detecting fan-out engine.
//!
//! Every artifact kind (super header, special headers, resource files) is
//! an [`Artifact`] bound to an ordered destination list in a
//! [`DistributionJob`] and pushed through one
//! [`Distributor`](distribute::Distributor).  A destination is written only
//! when its deployed copy is missing or differs, and the first failed write
//! ends the job.
pub mod aggregate;
pub mod compare;
pub mod distribute;
pub mod folders;
pub mod version;
pub mod writer;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::destinations::Destination;
use crate::error::SyncError;

pub use distribute::Distributor;
pub use writer::{FileWriter, TrackedFileWriter};

/// A file whose canonical content is synchronised to destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Where the canonical content lives for this run.
    pub source: PathBuf,
    /// Name the artifact is deployed under, relative to a destination folder.
    pub filename: PathBuf,
}

impl Artifact {
    /// Artifact read from `source` and deployed as `filename`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, filename: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            filename: filename.into(),
        }
    }

    /// Artifact deployed under the final component of `source`.
    ///
    /// `None` when `source` has no file name (e.g. ends in `..`).
    #[must_use]
    pub fn from_source(source: &Path) -> Option<Self> {
        let filename = source.file_name()?;
        Some(Self::new(source, filename))
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename.display())
    }
}

/// One artifact bound to the destinations it is fanned out to, in order.
#[derive(Debug, Clone, Copy)]
pub struct DistributionJob<'a> {
    /// What is distributed.
    pub artifact: &'a Artifact,
    /// Where it goes, in write order.
    pub destinations: &'a [Destination],
}

impl<'a> DistributionJob<'a> {
    /// Bind `artifact` to `destinations`.
    #[must_use]
    pub const fn new(artifact: &'a Artifact, destinations: &'a [Destination]) -> Self {
        Self {
            artifact,
            destinations,
        }
    }
}

/// Terminal status of a [`DistributionJob`].
#[derive(Debug)]
pub enum JobStatus {
    /// Every destination already matched or was written.
    Succeeded(JobStats),
    /// The write to `destinations[index]` failed; later destinations were
    /// not attempted.
    Failed {
        /// Position of the failing destination.
        index: usize,
        /// Counters for the destinations before it.
        stats: JobStats,
        /// The write error.
        error: SyncError,
    },
}

impl JobStatus {
    /// Convert into a `Result`, dropping the failure index.
    ///
    /// # Errors
    ///
    /// Returns the write error of a failed job.
    pub fn into_result(self) -> Result<JobStats, SyncError> {
        match self {
            Self::Succeeded(stats) => Ok(stats),
            Self::Failed { error, .. } => Err(error),
        }
    }
}

/// Counters for a distribution job or a whole stage.
///
/// # Examples
///
/// ```
/// use sdkdist_cli::sync::JobStats;
///
/// let stats = JobStats { written: 3, unchanged: 16 };
/// assert_eq!(stats.summary(false), "3 written, 16 unchanged");
/// assert_eq!(stats.summary(true), "3 would write, 16 unchanged");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    /// Destinations written (or that would be written in a dry run).
    pub written: u32,
    /// Destinations whose deployed copy already matched.
    pub unchanged: u32,
}

impl JobStats {
    /// Zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "2 written, 17 unchanged").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would write" } else { "written" };
        format!("{} {verb}, {} unchanged", self.written, self.unchanged)
    }
}

impl std::ops::AddAssign for JobStats {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.unchanged += other.unchanged;
    }
}
