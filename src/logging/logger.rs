//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, StageEntry, StageStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every event also reaches the persistent log file at
/// `$XDG_CACHE_HOME/sdkdist/<command>.log` through the tracing
/// [`FileLayer`](super::subscriber::FileLayer); this type only remembers
/// the path so the summary can print it.
#[derive(Debug)]
pub struct Logger {
    stages: Mutex<Vec<StageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.  Does not touch the filesystem.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(Some(log_file_path(command)))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            stages: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded stage entries.
    #[must_use]
    pub fn stage_entries(&self) -> Vec<StageEntry> {
        self.stages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "sdkdist::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "sdkdist::dry_run", "{msg}");
    }

    /// Record a stage result for the summary.
    pub fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.stages.lock() {
            guard.push(StageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print the summary of all recorded stages.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let stages = self.stage_entries();
        if stages.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        for entry in &stages {
            let (icon, color) = match entry.status {
                StageStatus::Ok => ("✓", "\x1b[32m"),
                StageStatus::DryRun => ("~", "\x1b[37m"),
                StageStatus::Failed => ("✗", "\x1b[31m"),
                StageStatus::NotRun => ("·", "\x1b[2m"),
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        if let Some(path) = &self.log_file {
            println!();
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>) {
        self.record_stage(name, status, message);
    }
}
