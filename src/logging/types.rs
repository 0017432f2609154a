//! Outcome tally collected for the run summary.
use crate::engine::{LinkOutcome, LinkStatus};

/// Counts of per-entry results seen during a run.
///
/// # Examples
///
/// ```
/// use flexdot_cli::logging::OutcomeTally;
///
/// let mut tally = OutcomeTally::default();
/// tally.created = 2;
/// tally.backed_up = 1;
/// tally.failed = 1;
/// assert_eq!(tally.total(), 3);
/// assert_eq!(
///     tally.summary(),
///     "3 entries: 2 created, 0 updated, 0 already linked, 1 failed, 1 backed up"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Entries that produced a new link.
    pub created: usize,
    /// Entries whose stale link was replaced.
    pub updated: usize,
    /// Entries that were already correct.
    pub already_linked: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Created entries that displaced a regular file.
    pub backed_up: usize,
}

impl OutcomeTally {
    /// Count one successful (or planned) outcome.
    pub const fn record(&mut self, outcome: &LinkOutcome) {
        match outcome.status {
            LinkStatus::AlreadyLinked => self.already_linked += 1,
            LinkStatus::LinkUpdated => self.updated += 1,
            LinkStatus::LinkCreated => self.created += 1,
        }
        if outcome.backed_up {
            self.backed_up += 1;
        }
    }

    /// Count one failed entry.
    pub const fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of entries processed, successful or not.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.already_linked + self.failed
    }

    /// One-line summary without color codes.
    #[must_use]
    pub fn summary(&self) -> String {
        let total = self.total();
        let noun = if total == 1 { "entry" } else { "entries" };
        let mut line = format!(
            "{total} {noun}: {} created, {} updated, {} already linked, {} failed",
            self.created, self.updated, self.already_linked, self.failed
        );
        if self.backed_up > 0 {
            line.push_str(&format!(", {} backed up", self.backed_up));
        }
        line
    }
}
