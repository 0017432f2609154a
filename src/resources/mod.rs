//! Filesystem primitives: symlink inspection and creation, backup buckets.
pub mod backup;
pub mod fs;
pub mod symlink;

use std::path::PathBuf;

/// What currently occupies a link destination.
///
/// # Examples
///
/// ```
/// use flexdot_cli::resources::TargetState;
///
/// let absent = TargetState::Absent;
/// let link = TargetState::Symlink { points_to: "/dots/bashrc".into() };
/// let dir = TargetState::Unsupported { kind: "directory" };
///
/// assert_ne!(absent, link);
/// assert!(matches!(dir, TargetState::Unsupported { kind: "directory" }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the destination.
    Absent,
    /// A symlink (possibly dangling) exists at the destination.
    Symlink {
        /// The raw link value as read from the filesystem.
        points_to: PathBuf,
    },
    /// A regular file exists at the destination.
    RegularFile,
    /// Something that must not be replaced (a directory, socket, …).
    Unsupported {
        /// Human-readable kind, e.g. `"directory"`.
        kind: &'static str,
    },
}
