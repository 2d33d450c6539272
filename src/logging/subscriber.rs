//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

const STAGE_TARGET: &str = "sdkdist::stage";
const DRY_RUN_TARGET: &str = "sdkdist::dry_run";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Info,
    Warn,
    Error,
    Debug,
}

impl Kind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => Self::Error,
            (tracing::Level::WARN, _) => Self::Warn,
            (tracing::Level::INFO, STAGE_TARGET) => Self::Stage,
            (tracing::Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (tracing::Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Pull the `message` field out of `event`.
fn message(event: &tracing::Event<'_>) -> String {
    #[derive(Default)]
    struct Visitor(String);

    impl tracing::field::Visit for Visitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }
    }

    let mut visitor = Visitor::default();
    event.record(&mut visitor);
    visitor.0
}

/// Plain-text log file line, stamped with `ts`.
fn file_line(kind: Kind, ts: &str, msg: &str) -> String {
    let tag = match kind {
        Kind::Stage => return format!("[{ts}] ==> {msg}"),
        Kind::DryRun => "[dry run] ",
        Kind::Error => "[error] ",
        Kind::Warn => "[warn] ",
        Kind::Debug => "[debug] ",
        Kind::Info => "",
    };
    format!("[{ts}]     {tag}{msg}")
}

/// Colored console line, without the trailing newline.
fn console_line(kind: Kind, msg: &str) -> String {
    match kind {
        Kind::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        Kind::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        Kind::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        Kind::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        Kind::Info => format!("  {msg}"),
        Kind::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::create(&log_file_path(command))
    }

    /// Create `path` (and its folder), write a run header, and return a
    /// layer appending to it.
    pub(super) fn create(path: &Path) -> Option<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok()?;
        }
        let version =
            option_env!("SDKDIST_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             sdkdist {version} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let msg = strip_ansi(&message(event));
        let line = file_line(Kind::of(event.metadata()), &format_utc_time(), &msg);

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits sdkdist-style
/// console output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", console_line(Kind::of(event.metadata()), &message(event)))
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Sets up a console subscriber (warnings and errors on stderr, everything
/// else on stdout) and a file subscriber that writes all events, `debug`
/// included, to `$XDG_CACHE_HOME/sdkdist/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_writes_run_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sync.log");
        FileLayer::create(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("sdkdist "));
        assert!(contents.starts_with("=========="));
    }

    #[test]
    fn file_layer_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.log");
        fs::write(&path, "stale line from last run\n").unwrap();
        FileLayer::create(&path).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("stale line"));
    }

    #[test]
    fn file_lines_tag_by_kind() {
        let ts = "12:00:00";
        assert_eq!(file_line(Kind::Stage, ts, "Ensure folders"), "[12:00:00] ==> Ensure folders");
        assert_eq!(file_line(Kind::Info, ts, "3 written"), "[12:00:00]     3 written");
        assert_eq!(
            file_line(Kind::DryRun, ts, "would update a.h"),
            "[12:00:00]     [dry run] would update a.h"
        );
        assert_eq!(file_line(Kind::Error, ts, "boom"), "[12:00:00]     [error] boom");
    }

    #[test]
    fn console_lines_have_no_ansi_once_stripped() {
        assert_eq!(strip_ansi(&console_line(Kind::Warn, "careful")), "WARN  careful");
        assert_eq!(strip_ansi(&console_line(Kind::Stage, "Done")), "==> Done");
        assert_eq!(strip_ansi(&console_line(Kind::Debug, "detail")), "  detail");
        assert_eq!(strip_ansi(&console_line(Kind::DryRun, "x")), "  [DRY RUN] x");
    }

    #[test]
    fn logger_events_are_classified_by_target() {
        let (log, tmp, _guard) = crate::logging::isolated_logger();
        log.stage("Aggregate super header");
        log.dry_run("would update /sdks/mac/burgerlib/burger.h");
        log.warn("\x1b[33mcolored\x1b[0m");

        let contents = fs::read_to_string(tmp.path().join("sdkdist").join("test.log")).unwrap();
        let lines: Vec<&str> = contents.lines().skip(3).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] ==> Aggregate super header"));
        assert!(lines[1].ends_with("]     [dry run] would update /sdks/mac/burgerlib/burger.h"));
        assert!(lines[2].ends_with("]     [warn] colored"));
    }
}
