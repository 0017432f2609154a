//! Link engine: applies resolved entries against the live filesystem.
//!
//! Entries are processed sequentially. Each one is inspected with a
//! non-following stat and moved through exactly one transition:
//!
//! | Destination               | Action                         | Outcome          |
//! |---------------------------|--------------------------------|------------------|
//! | symlink to the source     | none                           | `AlreadyLinked`  |
//! | symlink elsewhere         | remove, link                   | `LinkUpdated`    |
//! | regular file              | back up, link, prune backups   | `LinkCreated` (backup) |
//! | absent                    | create parents, link           | `LinkCreated`    |
//! | directory or special file | refuse                         | error            |
//!
//! A failing entry is reported and counted; the remaining entries still run.
//! The engine assumes it is the only writer to the destination root and the
//! backup directory for the duration of a run.
mod link;
mod outcome;

pub use outcome::{LinkOutcome, LinkStatus, Reporter};

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_KEEP_MAX_COUNT;
use crate::index::Entry;
use crate::resources::backup::BackupStore;
use crate::resources::fs::normalize;

/// Applies [`Entry`] values under a source root and a destination root.
#[derive(Debug, Clone)]
pub struct LinkEngine {
    source_root: PathBuf,
    dest_root: PathBuf,
    keep_max_count: i64,
    dry_run: bool,
    backups: BackupStore,
}

impl LinkEngine {
    /// Create an engine linking from `source_root` into `dest_root`.
    ///
    /// Backups go to `<source_root>/backup` and retention defaults to
    /// [`DEFAULT_KEEP_MAX_COUNT`]. Both roots should be absolute.
    #[must_use]
    pub fn new(source_root: &Path, dest_root: &Path) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            dest_root: normalize(dest_root),
            keep_max_count: DEFAULT_KEEP_MAX_COUNT,
            dry_run: false,
            backups: BackupStore::in_root(source_root),
        }
    }

    /// Set how many backup buckets to keep; `<= 0` disables pruning.
    #[must_use]
    pub const fn keep_max_count(mut self, keep: i64) -> Self {
        self.keep_max_count = keep;
        self
    }

    /// Inspect and report only; make no changes.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Use `store` instead of `<source_root>/backup`.
    #[must_use]
    pub fn with_backup_store(mut self, store: BackupStore) -> Self {
        self.backups = store;
        self
    }

    /// The backup store this engine displaces files into.
    #[must_use]
    pub const fn backups(&self) -> &BackupStore {
        &self.backups
    }

    /// Process every entry in order, reporting each result as it happens.
    pub fn apply(&self, entries: &[Entry], reporter: &dyn Reporter) -> ApplyReport {
        let mut report = ApplyReport::default();
        for entry in entries {
            tracing::debug!("processing {entry}");
            let result = if self.dry_run {
                self.plan_entry(entry)
            } else {
                self.link_entry(entry)
            };
            match result {
                Ok(outcome) => {
                    if self.dry_run {
                        reporter.report_planned(&outcome);
                    } else {
                        reporter.report(&outcome);
                    }
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    reporter.report_failure(entry, &e);
                    report.error_count += 1;
                }
            }
        }
        report
    }
}

/// Aggregate result of [`LinkEngine::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Outcomes of the entries that succeeded, in processing order.
    pub outcomes: Vec<LinkOutcome>,
    /// Number of entries that failed.
    pub error_count: usize,
}

impl ApplyReport {
    /// `true` if no entry failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error_count == 0
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use mockall::predicate::always;
    use std::cell::RefCell;

    mockall::mock! {
        Reporter {}
        impl Reporter for Reporter {
            fn report(&self, outcome: &LinkOutcome);
            fn report_planned(&self, outcome: &LinkOutcome);
            fn report_failure(&self, entry: &Entry, error: &LinkError);
        }
    }

    /// Records rendered lines so tests can assert on ordering.
    #[derive(Default)]
    struct Collect {
        lines: RefCell<Vec<String>>,
    }

    impl Reporter for Collect {
        fn report(&self, outcome: &LinkOutcome) {
            self.lines.borrow_mut().push(outcome.line());
        }

        fn report_planned(&self, outcome: &LinkOutcome) {
            self.lines.borrow_mut().push(format!("plan {}", outcome.line()));
        }

        fn report_failure(&self, entry: &Entry, error: &LinkError) {
            self.lines.borrow_mut().push(format!("fail {entry}: {error}"));
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        source_root: PathBuf,
        dest_root: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let source_root = tmp.path().join("dots");
            let dest_root = tmp.path().join("home");
            std::fs::create_dir_all(&source_root).unwrap();
            std::fs::create_dir_all(&dest_root).unwrap();
            Self {
                _tmp: tmp,
                source_root,
                dest_root,
            }
        }

        fn source(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.source_root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, content).unwrap();
            path
        }

        fn engine(&self) -> LinkEngine {
            LinkEngine::new(&self.source_root, &self.dest_root)
        }
    }

    fn run(engine: &LinkEngine, entries: &[Entry]) -> (ApplyReport, Vec<String>) {
        let collect = Collect::default();
        let report = engine.apply(entries, &collect);
        (report, collect.lines.into_inner())
    }

    #[test]
    fn absent_destination_is_created_with_parents() {
        let fx = Fixture::new();
        let source = fx.source("git/config", "[user]");

        let (report, lines) = run(&fx.engine(), &[Entry::new("git/config", ".config/git")]);

        let dest = fx.dest_root.join(".config/git/config");
        assert!(report.is_success());
        assert_eq!(lines, vec!["link created: .config/git/config"]);
        assert_eq!(std::fs::read_link(&dest).unwrap(), source);
        assert!(!report.outcomes[0].backed_up);
    }

    #[test]
    fn second_run_is_already_linked_and_idempotent() {
        let fx = Fixture::new();
        fx.source("f.txt", "x");
        let entries = [Entry::new("f.txt", ".")];
        let engine = fx.engine();

        run(&engine, &entries);
        let dest = fx.dest_root.join("f.txt");
        let before = std::fs::symlink_metadata(&dest).unwrap().modified().unwrap();

        let (report, lines) = run(&engine, &entries);
        assert_eq!(report.outcomes[0].status, LinkStatus::AlreadyLinked);
        assert_eq!(lines, vec!["already linked: f.txt"]);
        let after = std::fs::symlink_metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(before, after);
        assert!(!fx.engine().backups().base_dir().exists());
    }

    #[test]
    fn relative_link_to_source_counts_as_linked() {
        let fx = Fixture::new();
        fx.source("f.txt", "x");
        std::os::unix::fs::symlink("../dots/f.txt", fx.dest_root.join("f.txt")).unwrap();

        let (report, _) = run(&fx.engine(), &[Entry::new("f.txt", ".")]);
        assert_eq!(report.outcomes[0].status, LinkStatus::AlreadyLinked);
    }

    #[test]
    fn symlink_elsewhere_is_updated() {
        let fx = Fixture::new();
        let source = fx.source("f.txt", "new");
        let other = fx.source("other.txt", "old");
        let dest = fx.dest_root.join("f.txt");
        std::os::unix::fs::symlink(&other, &dest).unwrap();

        let (report, lines) = run(&fx.engine(), &[Entry::new("f.txt", ".")]);
        assert_eq!(lines, vec!["link updated: f.txt"]);
        assert_eq!(std::fs::read_link(&dest).unwrap(), source);
        assert_eq!(std::fs::read_to_string(other).unwrap(), "old");
        assert!(!report.outcomes[0].backed_up);
    }

    #[test]
    fn regular_file_is_backed_up_then_linked() {
        let fx = Fixture::new();
        let source = fx.source("f.txt", "managed");
        let dest = fx.dest_root.join("f.txt");
        std::fs::write(&dest, "original bytes").unwrap();

        let engine = fx.engine();
        let (report, lines) = run(&engine, &[Entry::new("f.txt", ".")]);

        assert_eq!(lines, vec!["link created: f.txt (backup)"]);
        assert!(report.outcomes[0].backed_up);
        assert_eq!(std::fs::read_link(&dest).unwrap(), source);

        let buckets = engine.backups().buckets();
        assert_eq!(buckets.len(), 1);
        assert_eq!(
            std::fs::read_to_string(buckets[0].join("f.txt")).unwrap(),
            "original bytes"
        );
    }

    #[test]
    fn backup_prunes_old_buckets() {
        let fx = Fixture::new();
        fx.source("f.txt", "managed");
        std::fs::write(fx.dest_root.join("f.txt"), "original").unwrap();
        let engine = fx.engine().keep_max_count(1);
        for name in ["20000101000000", "20000101000001"] {
            std::fs::create_dir_all(engine.backups().base_dir().join(name)).unwrap();
        }

        let (report, _) = run(&engine, &[Entry::new("f.txt", ".")]);
        assert!(report.is_success());
        let buckets = engine.backups().buckets();
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].join("f.txt").is_file());
    }

    #[test]
    fn non_positive_keep_disables_pruning() {
        let fx = Fixture::new();
        fx.source("f.txt", "managed");
        std::fs::write(fx.dest_root.join("f.txt"), "original").unwrap();
        let engine = fx.engine().keep_max_count(0);
        std::fs::create_dir_all(engine.backups().base_dir().join("20000101000000")).unwrap();

        run(&engine, &[Entry::new("f.txt", ".")]);
        assert_eq!(engine.backups().buckets().len(), 2);
    }

    #[test]
    fn failed_backup_leaves_file_and_creates_no_link() {
        let fx = Fixture::new();
        fx.source("f.txt", "managed");
        let dest = fx.dest_root.join("f.txt");
        std::fs::write(&dest, "original").unwrap();
        // A file where the backup directory should go makes bucket creation fail.
        let blocker = fx.source_root.join("blocked");
        std::fs::write(&blocker, "").unwrap();
        let engine = fx.engine().with_backup_store(BackupStore::new(blocker));

        let (report, lines) = run(&engine, &[Entry::new("f.txt", ".")]);
        assert_eq!(report.error_count, 1);
        assert!(lines[0].starts_with("fail f.txt -> ."), "got {lines:?}");
        assert!(!std::fs::symlink_metadata(&dest).unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "original");
    }

    #[test]
    fn directory_destination_fails_and_others_continue() {
        let fx = Fixture::new();
        fx.source("a", "a");
        fx.source("b", "b");
        std::fs::create_dir_all(fx.dest_root.join("a")).unwrap();

        let (report, lines) = run(
            &fx.engine(),
            &[Entry::new("a", "."), Entry::new("b", ".")],
        );
        assert_eq!(report.error_count, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert!(lines[0].contains("refusing to replace"), "got {lines:?}");
        assert_eq!(lines[1], "link created: b");
        assert!(fx.dest_root.join("a").is_dir());
    }

    #[test]
    fn missing_source_still_links() {
        let fx = Fixture::new();
        let (report, _) = run(&fx.engine(), &[Entry::new("nope", ".")]);
        assert!(report.is_success());
        assert_eq!(
            std::fs::read_link(fx.dest_root.join("nope")).unwrap(),
            fx.source_root.join("nope")
        );
    }

    #[test]
    fn absolute_destination_stays_under_dest_root() {
        let fx = Fixture::new();
        fx.source("f.txt", "x");
        let outside = fx.source_root.parent().unwrap().join("outside");

        let (report, lines) = run(&fx.engine(), &[Entry::new("f.txt", outside.clone())]);
        assert!(report.is_success());
        let expected = fx
            .dest_root
            .join(outside.strip_prefix("/").unwrap())
            .join("f.txt");
        assert_eq!(report.outcomes[0].destination, expected);
        assert!(lines[0].starts_with("link created: "), "got {lines:?}");
        assert!(!lines[0].contains("link created: /"), "got {lines:?}");
        assert!(expected.is_symlink());
        assert!(!outside.exists());
    }

    #[test]
    fn absolute_source_stays_under_source_root() {
        let fx = Fixture::new();
        let source = fx.source("etc/hosts", "managed");

        let (report, _) = run(&fx.engine(), &[Entry::new("/etc/hosts", ".")]);
        assert!(report.is_success());
        assert_eq!(
            std::fs::read_link(fx.dest_root.join("hosts")).unwrap(),
            source
        );
    }

    #[test]
    fn parent_relative_destination_is_reported_relative() {
        let fx = Fixture::new();
        fx.source("x", "x");

        let (_, lines) = run(&fx.engine(), &[Entry::new("x", "../opt")]);
        assert_eq!(lines, vec!["link created: ../opt/x"]);
    }

    #[test]
    fn dry_run_reports_plan_without_mutation() {
        let fx = Fixture::new();
        fx.source("new", "n");
        fx.source("file", "f");
        fx.source("moved", "m");
        let other = fx.source("other", "o");
        std::fs::write(fx.dest_root.join("file"), "original").unwrap();
        std::os::unix::fs::symlink(&other, fx.dest_root.join("moved")).unwrap();

        let engine = fx.engine().dry_run(true);
        let (report, lines) = run(
            &engine,
            &[
                Entry::new("new", "sub"),
                Entry::new("file", "."),
                Entry::new("moved", "."),
            ],
        );

        assert!(report.is_success());
        assert_eq!(
            lines,
            vec![
                "plan link created: sub/new",
                "plan link created: file (backup)",
                "plan link updated: moved",
            ]
        );
        assert!(!fx.dest_root.join("sub").exists());
        assert_eq!(
            std::fs::read_to_string(fx.dest_root.join("file")).unwrap(),
            "original"
        );
        assert_eq!(std::fs::read_link(fx.dest_root.join("moved")).unwrap(), other);
        assert!(!engine.backups().base_dir().exists());
    }

    #[test]
    fn reporter_called_once_per_entry() {
        let fx = Fixture::new();
        fx.source("a", "a");
        fx.source("b", "b");
        std::fs::create_dir_all(fx.dest_root.join("c")).unwrap();
        fx.source("c", "c");

        let mut reporter = MockReporter::new();
        reporter
            .expect_report()
            .withf(|o| o.status == LinkStatus::LinkCreated && !o.backed_up)
            .times(2)
            .return_const(());
        reporter
            .expect_report_failure()
            .with(always(), always())
            .times(1)
            .return_const(());
        reporter.expect_report_planned().never();

        let entries = [Entry::new("a", "."), Entry::new("b", "."), Entry::new("c", ".")];
        let report = fx.engine().apply(&entries, &reporter);
        assert_eq!(report.error_count, 1);
    }

    #[test]
    fn dry_run_uses_planned_channel() {
        let fx = Fixture::new();
        fx.source("a", "a");

        let mut reporter = MockReporter::new();
        reporter.expect_report().never();
        reporter
            .expect_report_planned()
            .times(1)
            .return_const(());

        let report = fx
            .engine()
            .dry_run(true)
            .apply(&[Entry::new("a", ".")], &reporter);
        assert!(report.is_success());
    }
}
