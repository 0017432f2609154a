// Shared helpers for integration tests.
//
// Provides a temporary dotfiles repository plus a destination root, and a
// fluent builder so each test can describe its starting filesystem without
// repeating boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flexdot_cli::engine::{LinkEngine, LinkOutcome, Reporter};
use flexdot_cli::error::LinkError;
use flexdot_cli::index::{Entry, IndexTree, resolve};

/// An isolated dotfiles repository and home directory backed by a
/// [`tempfile::TempDir`].
///
/// ```text
/// <tmp>/dots/   source root (index.yml, config.yml, backup/)
/// <tmp>/home/   destination root
/// <tmp>/cache/  XDG_CACHE_HOME for binary runs
/// ```
pub struct IntegrationTestContext {
    /// Temporary directory holding everything below.
    pub tmp: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create empty source and destination roots.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        for dir in ["dots", "home", "cache"] {
            std::fs::create_dir_all(tmp.path().join(dir)).expect("create dir");
        }
        Self { tmp }
    }

    /// Dotfiles (source) root.
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("dots")
    }

    /// Destination root.
    pub fn home(&self) -> PathBuf {
        self.tmp.path().join("home")
    }

    /// Cache directory to use as `XDG_CACHE_HOME`.
    pub fn cache(&self) -> PathBuf {
        self.tmp.path().join("cache")
    }

    /// Backup directory under the source root.
    pub fn backup_dir(&self) -> PathBuf {
        self.root().join("backup")
    }

    /// Bucket directories currently under the backup directory, sorted.
    pub fn buckets(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.backup_dir()) else {
            return Vec::new();
        };
        let mut buckets: Vec<PathBuf> = entries.map(|e| e.expect("dir entry").path()).collect();
        buckets.sort();
        buckets
    }

    /// Resolve `index.yml` from the source root.
    pub fn entries(&self) -> Vec<Entry> {
        let tree = IndexTree::load(&self.root().join("index.yml")).expect("load index");
        resolve(&tree, &self.root())
    }

    /// Resolve the index and apply it with the given retention count,
    /// returning the rendered lines reported.
    pub fn install(&self, keep_max_count: i64) -> (usize, Vec<String>) {
        let reporter = LineReporter::default();
        let report = LinkEngine::new(&self.root(), &self.home())
            .keep_max_count(keep_max_count)
            .apply(&self.entries(), &reporter);
        (report.error_count, reporter.lines.into_inner())
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a context with empty roots.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `index.yml` in the source root.
    pub fn with_index(self, yaml: &str) -> Self {
        write(&self.ctx.root().join("index.yml"), yaml);
        self
    }

    /// Write `config.yml` in the source root.
    pub fn with_config(self, yaml: &str) -> Self {
        write(&self.ctx.root().join("config.yml"), yaml);
        self
    }

    /// Write a file under the source root.
    pub fn with_source(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.root().join(rel), content);
        self
    }

    /// Write a regular file under the destination root.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.home().join(rel), content);
        self
    }

    /// Create a symlink under the destination root pointing to `target`.
    #[cfg(unix)]
    pub fn with_home_symlink(self, rel: &str, target: &Path) -> Self {
        let link = self.ctx.home().join(rel);
        std::fs::create_dir_all(link.parent().expect("parent")).expect("create parent");
        std::os::unix::fs::symlink(target, link).expect("create symlink");
        self
    }

    /// Create an empty bucket directory under the backup directory.
    pub fn with_bucket(self, name: &str) -> Self {
        std::fs::create_dir_all(self.ctx.backup_dir().join(name)).expect("create bucket");
        self
    }

    /// Finalise and return the context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    std::fs::write(path, content).expect("write file");
}

/// Reporter that renders every callback as a plain line.
#[derive(Default)]
pub struct LineReporter {
    pub lines: std::cell::RefCell<Vec<String>>,
}

impl Reporter for LineReporter {
    fn report(&self, outcome: &LinkOutcome) {
        self.lines.borrow_mut().push(outcome.line());
    }

    fn report_planned(&self, outcome: &LinkOutcome) {
        self.lines.borrow_mut().push(format!("[dry run] {}", outcome.line()));
    }

    fn report_failure(&self, entry: &Entry, error: &LinkError) {
        self.lines.borrow_mut().push(format!("error: {entry}: {error}"));
    }
}
