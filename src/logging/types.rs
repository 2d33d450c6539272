//! Core logging types: stage entries, status, and the [`Log`] trait.

/// Stage result for summary reporting.
#[derive(Debug, Clone)]
pub struct StageEntry {
    /// Human-readable stage name.
    pub name: String,
    /// Final status of the stage.
    pub status: StageStatus,
    /// Optional detail (counters or the error description).
    pub message: Option<String>,
}

/// Status of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage completed successfully.
    Ok,
    /// Stage ran in dry-run mode; no destination was written.
    DryRun,
    /// Stage failed and aborted the run.
    Failed,
    /// Stage was never reached because an earlier one failed.
    NotRun,
}

/// Abstraction over logging backends.
///
/// The pipeline and the distributor log through this trait so tests can
/// pass any implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a stage result for the summary.
    fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>);
}
