//! Header Aggregator: builds the super header with an external tool.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::SyncError;
use crate::exec::Executor;

/// Expands a header template into a single output file.
pub trait TemplateExpander: fmt::Debug {
    /// Expand `template` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ProcessStatus`] with the tool's exit status
    /// unchanged, or [`SyncError::ProcessLaunch`] if it could not start.
    fn expand(&self, template: &Path, output: &Path) -> Result<(), SyncError>;
}

/// Runs `makeheader <template> <output>` in the working directory and
/// blocks until it exits.
#[derive(Debug)]
pub struct MakeHeader {
    program: String,
    working_dir: PathBuf,
    executor: Arc<dyn Executor>,
}

impl MakeHeader {
    /// Run `program` from `working_dir` through `executor`.
    #[must_use]
    pub fn new(program: impl Into<String>, working_dir: &Path, executor: Arc<dyn Executor>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.to_path_buf(),
            executor,
        }
    }
}

impl TemplateExpander for MakeHeader {
    fn expand(&self, template: &Path, output: &Path) -> Result<(), SyncError> {
        let template = template.to_string_lossy();
        let output = output.to_string_lossy();
        let result = self
            .executor
            .run_in_unchecked(&self.working_dir, &self.program, &[&template, &output])
            .map_err(|e| SyncError::ProcessLaunch {
                program: self.program.clone(),
                source: e.into(),
            })?;
        if !result.stdout.trim().is_empty() {
            tracing::debug!("{}: {}", self.program, result.stdout.trim());
        }
        if result.success {
            return Ok(());
        }
        if !result.stderr.trim().is_empty() {
            tracing::warn!("{}: {}", self.program, result.stderr.trim());
        }
        Err(SyncError::ProcessStatus {
            program: self.program.clone(),
            // killed by a signal: no code to pass through
            code: result.code.unwrap_or(1),
        })
    }
}
