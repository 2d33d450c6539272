//! Domain-specific error types for the distribution engine.
//!
//! Internal modules return [`SyncError`]; the pipeline wraps the first
//! failure in a [`StageError`] that names the stage it came from.  Command
//! handlers at the CLI boundary convert to [`anyhow::Error`] via `?` and
//! [`exit_status`] recovers the numeric status for the process exit code.
//!
//! # Error hierarchy
//!
//! ```text
//! StageError { stage, source }
//! └── SyncError
//!     ├── Filesystem      folder creation, read, copy
//!     ├── ProcessStatus   external tool exited non-zero
//!     ├── ProcessLaunch   external tool could not be started
//!     └── SourceControl   tracked-state query, checkout, revision lookup
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Broad family of a failure, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Local filesystem operation failed.
    Filesystem,
    /// An external process failed or could not be started.
    ExternalProcess,
    /// A source-control operation failed.
    SourceControl,
}

/// A single failure inside one stage of the pipeline.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A filesystem operation failed.
    #[error("{action} {}: {source}", path.display())]
    Filesystem {
        /// Short verb describing the operation (e.g. `"create folder"`).
        action: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external process ran and returned a non-zero status.
    #[error("'{program}' exited with status {code}")]
    ProcessStatus {
        /// Program that was invoked.
        program: String,
        /// Exit status, surfaced unchanged.
        code: i32,
    },

    /// An external process could not be launched at all.
    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        /// Program that was invoked.
        program: String,
        /// Underlying launch error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source-control operation failed.
    #[error("source control: {message}")]
    SourceControl {
        /// Human-readable description.
        message: String,
        /// Exit status of the source-control tool, when there was one.
        code: Option<i32>,
    },
}

impl SyncError {
    /// Build a [`SyncError::Filesystem`] for `path`.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Build a [`SyncError::SourceControl`] without an exit status.
    pub fn vcs(message: impl Into<String>) -> Self {
        Self::SourceControl {
            message: message.into(),
            code: None,
        }
    }

    /// Failure family of this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Filesystem { .. } => FailureKind::Filesystem,
            Self::ProcessStatus { .. } | Self::ProcessLaunch { .. } => {
                FailureKind::ExternalProcess
            }
            Self::SourceControl { .. } => FailureKind::SourceControl,
        }
    }

    /// Numeric status for this failure; never `0`.
    ///
    /// Process exit codes pass through unchanged, filesystem errors use the
    /// OS error number when one is available, everything else is `1`.
    #[must_use]
    pub fn status(&self) -> i32 {
        let code = match self {
            Self::Filesystem { source, .. } => source.raw_os_error().unwrap_or(1),
            Self::ProcessStatus { code, .. } => *code,
            Self::ProcessLaunch { .. } => 1,
            Self::SourceControl { code, .. } => code.unwrap_or(1),
        };
        if code == 0 { 1 } else { code }
    }
}

/// The failure that aborted the pipeline, tagged with its stage.
#[derive(Error, Debug)]
#[error("stage '{}' failed: {source}", stage.name())]
pub struct StageError {
    /// Stage that was running when the failure happened.
    pub stage: Stage,
    /// The failure itself.
    pub source: SyncError,
}

impl StageError {
    /// Status of the underlying failure.
    #[must_use]
    pub fn status(&self) -> i32 {
        self.source.status()
    }

    /// Failure family of the underlying error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.source.kind()
    }
}

/// Map an error returned by a command handler to a process exit status.
///
/// Pipeline failures keep their stage status (clamped to `1..=255`); any
/// other error exits with `1`.
#[must_use]
pub fn exit_status(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<StageError>()
        .map_or(1, |e| u8::try_from(e.status()).ok().filter(|&c| c != 0).unwrap_or(1))
}

/// `true` when `err` is a stage failure, which the pipeline logs as it
/// aborts.
#[must_use]
pub fn already_logged(err: &anyhow::Error) -> bool {
    err.is::<StageError>()
}
