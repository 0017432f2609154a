//! Backup store: time-bucketed directories for files displaced by links.
//!
//! ```text
//! <root>/backup/
//! ├── 20240101120000/
//! │   ├── .bashrc
//! │   └── .bashrc.1
//! └── 20240102083015/
//!     └── .vimrc
//! ```
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::BackupError;

/// Name of the backup directory inside the dotfiles root.
pub const BACKUP_DIR: &str = "backup";

/// `strftime` format of bucket names (second resolution, sortable).
const BUCKET_FORMAT: &str = "%Y%m%d%H%M%S";

/// Length of a bucket name produced by [`BUCKET_FORMAT`].
const BUCKET_NAME_LEN: usize = 14;

/// Format a bucket name for `time`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use flexdot_cli::resources::backup::bucket_name;
///
/// let time = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(bucket_name(&time), "20240102030405");
/// ```
#[must_use]
pub fn bucket_name(time: &DateTime<Local>) -> String {
    time.format(BUCKET_FORMAT).to_string()
}

/// Whether `name` looks like a bucket name: exactly 14 ASCII digits.
#[must_use]
pub fn is_bucket_name(name: &str) -> bool {
    name.len() == BUCKET_NAME_LEN && name.bytes().all(|b| b.is_ascii_digit())
}

/// Remove `bucket` if it holds no entries. Best effort; returns whether it
/// was removed.
pub fn remove_bucket_if_empty(bucket: &Path) -> bool {
    let is_empty = std::fs::read_dir(bucket).is_ok_and(|mut entries| entries.next().is_none());
    is_empty && std::fs::remove_dir(bucket).is_ok()
}

/// Manages the backup buckets under a single base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStore {
    base: PathBuf,
}

impl BackupStore {
    /// Create a store rooted at `base`.
    #[must_use]
    pub const fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Create a store at `<root>/backup`.
    #[must_use]
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(BACKUP_DIR))
    }

    /// Base directory holding all buckets.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Move `path` into the bucket for the current second and return the
    /// bucket directory.
    ///
    /// # Errors
    ///
    /// See [`backup_file_into`](Self::backup_file_into).
    pub fn backup_file(&self, path: &Path) -> Result<PathBuf, BackupError> {
        self.backup_file_into(path, &bucket_name(&Local::now()))
    }

    /// Move `path` into the bucket called `bucket` and return the bucket
    /// directory.
    ///
    /// The bucket is created if needed. The file keeps its basename; if the
    /// bucket already holds that name, the file is stored as `<name>.<n>`
    /// with the smallest free `n`. When the move fails the bucket is removed
    /// again if it is left empty.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CreateBucket`] if the bucket cannot be created
    /// and [`BackupError::Move`] if the file cannot be moved (for example
    /// across filesystems).
    pub fn backup_file_into(&self, path: &Path, bucket: &str) -> Result<PathBuf, BackupError> {
        let bucket = self.base.join(bucket);
        std::fs::create_dir_all(&bucket).map_err(|source| BackupError::CreateBucket {
            path: bucket.clone(),
            source,
        })?;

        let Some(file_name) = path.file_name() else {
            remove_bucket_if_empty(&bucket);
            return Err(BackupError::Move {
                from: path.to_path_buf(),
                to: bucket,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no file name",
                ),
            });
        };

        let dest = free_slot(&bucket, file_name.to_os_string());
        if let Err(source) = std::fs::rename(path, &dest) {
            remove_bucket_if_empty(&bucket);
            return Err(BackupError::Move {
                from: path.to_path_buf(),
                to: dest,
                source,
            });
        }
        tracing::debug!("backed up {} to {}", path.display(), dest.display());
        Ok(bucket)
    }

    /// Bucket directories, newest first. Entries whose name is not a bucket
    /// name are ignored; an unreadable base directory yields nothing.
    #[must_use]
    pub fn buckets(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.base) else {
            return Vec::new();
        };
        let mut buckets: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter(|e| e.file_name().to_str().is_some_and(is_bucket_name))
            .map(|e| e.path())
            .collect();
        buckets.sort_by(|a, b| b.cmp(a));
        buckets
    }

    /// Delete every bucket beyond the newest `keep`. A `keep` of zero or
    /// less disables pruning. Returns the buckets that were removed.
    ///
    /// Failures are logged and skipped.
    pub fn prune(&self, keep: i64) -> Vec<PathBuf> {
        let Ok(keep) = usize::try_from(keep) else {
            return Vec::new();
        };
        if keep == 0 {
            return Vec::new();
        }

        let mut removed = Vec::new();
        for bucket in self.buckets().into_iter().skip(keep) {
            match std::fs::remove_dir_all(&bucket) {
                Ok(()) => {
                    tracing::debug!("pruned backup {}", bucket.display());
                    removed.push(bucket);
                }
                Err(e) => tracing::warn!("cannot prune backup {}: {e}", bucket.display()),
            }
        }
        removed
    }

    /// Recursively delete the base directory. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Clear`] if the directory exists but cannot be
    /// removed.
    pub fn clear_all(&self) -> Result<bool, BackupError> {
        match std::fs::remove_dir_all(&self.base) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(BackupError::Clear {
                path: self.base.clone(),
                source,
            }),
        }
    }
}

/// First path in `bucket` for `name` that is not taken.
fn free_slot(bucket: &Path, name: OsString) -> PathBuf {
    let mut candidate = bucket.join(&name);
    let mut n = 1_u32;
    while candidate.symlink_metadata().is_ok() {
        let mut suffixed = name.clone();
        suffixed.push(format!(".{n}"));
        candidate = bucket.join(suffixed);
        n += 1;
    }
    candidate
}
