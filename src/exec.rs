//! External process execution behind an injectable [`Executor`].
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit status; `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so collaborators that shell out
/// (template expansion, Perforce) can be tested without real programs.
///
/// Every call blocks until the child exits; there is no timeout.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command in `dir`, returning its result even on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn run_in_unchecked_captures_stdout_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("burger.h"), "").unwrap();
        let result = SystemExecutor
            .run_in_unchecked(dir.path(), "ls", &[])
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "burger.h");
    }

    #[cfg(not(windows))]
    #[test]
    fn run_in_unchecked_reports_exit_code() {
        let dir = std::env::temp_dir();
        let result = SystemExecutor
            .run_in_unchecked(&dir, "sh", &["-c", "exit 3"])
            .unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
        assert_eq!(result.code, Some(3));
    }

    #[test]
    fn run_in_unchecked_missing_program_is_error() {
        let dir = std::env::temp_dir();
        let result =
            SystemExecutor.run_in_unchecked(&dir, "this-program-does-not-exist-12345", &[]);
        assert!(result.is_err(), "launch failure should be an error");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[test]
    fn mock_replays_responses_and_records_calls() {
        let dir = std::env::temp_dir();
        let mock = test_helpers::MockExecutor::with_responses(vec![(0, "a"), (2, "")]);
        assert!(mock.run_in_unchecked(&dir, "p4", &["fstat", "x"]).unwrap().success);
        let second = mock.run_in_unchecked(&dir, "p4", &["edit", "x"]).unwrap();
        assert_eq!(second.code, Some(2));
        assert_eq!(mock.calls(), vec!["p4 fstat x", "p4 edit x"]);
    }
}
