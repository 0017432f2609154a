//! Domain-specific error types for the flexdot engine.
//!
//! Internal modules return typed errors (e.g., [`IndexError`], [`LinkError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! FlexdotError
//! ├── Config(ConfigError): config.yml loading, missing install parameters
//! ├── Index(IndexError)  : index file reading and structure
//! ├── Link(LinkError)    : per-entry link failures (recovered by the engine)
//! └── Backup(BackupError): displacing files into backup buckets
//! ```
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the flexdot engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum FlexdotError {
    /// Configuration-related error (config file, missing parameters).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The index definition could not be read or is malformed.
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// A single entry could not be linked.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// A backup operation failed.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),
}

/// Errors that arise from `config.yml` handling and parameter resolution.
///
/// All of these are fatal and surface before any filesystem mutation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No destination root was given on the command line or in `config.yml`.
    #[error("home_dir must be specified by --home_dir/-H or config.yml")]
    MissingHomeDir,

    /// No index file was given on the command line or in `config.yml`.
    #[error("<index.yml> must be specified as argument or config.yml")]
    MissingIndex,

    /// `init` refuses to overwrite an existing configuration file.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// An I/O error occurred while reading or writing the config file.
    #[error("IO error on config file {}: {source}", path.display())]
    Io {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML or has values of the wrong type.
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml_ng::Error,
    },
}

/// Errors that arise while loading the index definition.
///
/// Any of these aborts the install before a single entry is processed.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The index file could not be read.
    #[error("Failed to open index file {}: {source}", path.display())]
    Io {
        /// Path to the index file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The index file is not a nested mapping of path segments to
    /// mappings or destination strings.
    #[error("Failed to decode index {}: {source}", path.display())]
    Parse {
        /// Path to the index file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml_ng::Error,
    },
}

/// Errors that arise while linking a single entry.
///
/// The engine logs and counts these, then moves on to the next entry.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The source path could not be made absolute.
    #[error("cannot resolve absolute path for {}: {source}", path.display())]
    Absolutize {
        /// Path that failed to resolve.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source path has no final component to name the link after.
    #[error("source {} has no file name", path.display())]
    NoFileName {
        /// Absolute source path.
        path: PathBuf,
    },

    /// The destination could not be inspected (other than "not found").
    #[error("cannot inspect {}: {source}", path.display())]
    Inspect {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The destination exists but is neither a symlink nor a regular file.
    #[error("refusing to replace {} ({kind})", path.display())]
    UnsupportedTarget {
        /// Destination path.
        path: PathBuf,
        /// Human-readable file kind, e.g. `"directory"`.
        kind: &'static str,
    },

    /// An outdated symlink could not be removed.
    #[error("cannot remove {}: {source}", path.display())]
    Remove {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The destination's parent directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateParent {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The symlink itself could not be created.
    #[error("cannot link {} -> {}: {source}", link.display(), target.display())]
    Create {
        /// Path of the symlink.
        link: PathBuf,
        /// Path the symlink should point to.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The pre-existing file could not be backed up; no link was created.
    #[error(transparent)]
    Backup(#[from] BackupError),
}

/// Errors that arise from the backup store.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The bucket directory could not be created.
    #[error("cannot create backup directory {}: {source}", path.display())]
    CreateBucket {
        /// Bucket directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The displaced file could not be moved into its bucket.
    #[error("cannot back up {} to {}: {source}", from.display(), to.display())]
    Move {
        /// File being displaced.
        from: PathBuf,
        /// Destination inside the bucket.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backup directory could not be removed.
    #[error("cannot remove backup directory {}: {source}", path.display())]
    Clear {
        /// Base backup directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
