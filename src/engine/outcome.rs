//! Per-entry link outcomes and the [`Reporter`] seam.
use std::fmt;
use std::path::PathBuf;

use crate::error::LinkError;
use crate::index::Entry;

/// Terminal state of one entry after the engine has processed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// The destination already pointed at the source; nothing was touched.
    AlreadyLinked,
    /// A symlink pointing elsewhere was replaced.
    LinkUpdated,
    /// A new symlink was created, possibly after backing up a regular file.
    LinkCreated,
}

impl LinkStatus {
    /// Console phrase printed before the destination path.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexdot_cli::engine::LinkStatus;
    ///
    /// assert_eq!(LinkStatus::AlreadyLinked.phrase(), "already linked:");
    /// assert_eq!(LinkStatus::LinkCreated.phrase(), "link created:");
    /// ```
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::AlreadyLinked => "already linked:",
            Self::LinkUpdated => "link updated:",
            Self::LinkCreated => "link created:",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Result of processing a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// What happened to the destination.
    pub status: LinkStatus,
    /// Whether a regular file was moved into a backup bucket first.
    pub backed_up: bool,
    /// Absolute path of the symlink.
    pub destination: PathBuf,
    /// Destination relative to the destination root, for display.
    pub relative_path: PathBuf,
}

impl LinkOutcome {
    /// Plain console line: `<phrase> <relative path>[ (backup)]`.
    #[must_use]
    pub fn line(&self) -> String {
        let suffix = if self.backed_up { " (backup)" } else { "" };
        format!(
            "{} {}{suffix}",
            self.status.phrase(),
            self.relative_path.display()
        )
    }
}

/// Receives outcomes as the engine produces them, one entry at a time.
pub trait Reporter {
    /// An entry was applied.
    fn report(&self, outcome: &LinkOutcome);
    /// An entry was inspected in dry-run mode; `outcome` is what applying
    /// it would produce.
    fn report_planned(&self, outcome: &LinkOutcome);
    /// An entry failed; the engine moves on to the next one.
    fn report_failure(&self, entry: &Entry, error: &LinkError);
}
