//! Structured logger with dry-run awareness and outcome tally.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::OutcomeTally;
use super::utils::log_file_path;
use crate::engine::{LinkOutcome, LinkStatus, Reporter};
use crate::error::LinkError;
use crate::index::Entry;

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "flexdot::stage";
/// Tracing target for dry-run lines.
pub(super) const DRY_RUN_TARGET: &str = "flexdot::dry_run";
/// Tracing target for per-entry outcome lines.
pub(super) const OUTCOME_TARGET: &str = "flexdot::outcome";

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/flexdot/<command>.log` (default `~/.cache/flexdot/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
///
/// `Logger` is the console [`Reporter`] for the link engine.
#[derive(Debug)]
pub struct Logger {
    tally: Mutex<OutcomeTally>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The log file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber);
    /// this constructor does not write to it.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that points the summary at `log_file`.
    #[must_use]
    pub fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            tally: Mutex::new(OutcomeTally::default()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
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
        tracing::info!(target: STAGE_TARGET, "{msg}");
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
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Snapshot of the outcomes recorded so far.
    #[must_use]
    pub fn tally(&self) -> OutcomeTally {
        self.tally.lock().map_or_else(|_| OutcomeTally::default(), |g| *g)
    }

    /// Print the run summary: outcome counts and the log file location.
    pub fn print_summary(&self) {
        let tally = self.tally();
        if tally.total() == 0 {
            return;
        }

        println!();
        self.stage("Summary");
        let summary = tally.summary();
        if tally.failed > 0 {
            self.info(&format!("\x1b[31m{summary}\x1b[0m"));
        } else {
            self.info(&summary);
        }

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }

    fn record(&self, outcome: &LinkOutcome) {
        if let Ok(mut guard) = self.tally.lock() {
            guard.record(outcome);
        }
    }
}

/// Console rendering of an outcome: colored phrase, relative path, backup marker.
fn colored_line(outcome: &LinkOutcome) -> String {
    let color = match outcome.status {
        LinkStatus::AlreadyLinked => "\x1b[90m",
        LinkStatus::LinkUpdated => "\x1b[33m",
        LinkStatus::LinkCreated => "\x1b[32m",
    };
    let suffix = if outcome.backed_up { " (backup)" } else { "" };
    format!(
        "{color}{}\x1b[0m {}{suffix}",
        outcome.status.phrase(),
        outcome.relative_path.display()
    )
}

impl Reporter for Logger {
    fn report(&self, outcome: &LinkOutcome) {
        tracing::info!(target: OUTCOME_TARGET, "{}", colored_line(outcome));
        self.record(outcome);
    }

    fn report_planned(&self, outcome: &LinkOutcome) {
        self.dry_run(&outcome.line());
        self.record(outcome);
    }

    fn report_failure(&self, entry: &Entry, error: &LinkError) {
        self.error(&format!("{entry}: {error}"));
        if let Ok(mut guard) = self.tally.lock() {
            guard.record_failure();
        }
    }
}
