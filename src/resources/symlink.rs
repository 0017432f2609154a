//! Symlink resource: inspect a destination path and point it at a source.
use std::path::{Path, PathBuf};

use super::TargetState;
use super::fs::{ensure_parent_dir, normalize};
use crate::error::LinkError;

/// A symlink at `target` that should point to `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkResource {
    /// Absolute path the symlink points to.
    pub source: PathBuf,
    /// Path where the symlink lives.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Human-readable description of this link.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Inspect `target` without following it.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Inspect`] if the path cannot be examined for a
    /// reason other than not existing (permissions, a file in place of a
    /// parent directory, …).
    pub fn current_state(&self) -> Result<TargetState, LinkError> {
        let inspect_err = |source| LinkError::Inspect {
            path: self.target.clone(),
            source,
        };

        let meta = match std::fs::symlink_metadata(&self.target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TargetState::Absent);
            }
            Err(e) => return Err(inspect_err(e)),
        };

        let file_type = meta.file_type();
        if file_type.is_symlink() {
            let points_to = std::fs::read_link(&self.target).map_err(inspect_err)?;
            Ok(TargetState::Symlink { points_to })
        } else if file_type.is_file() {
            Ok(TargetState::RegularFile)
        } else if file_type.is_dir() {
            Ok(TargetState::Unsupported { kind: "directory" })
        } else {
            Ok(TargetState::Unsupported {
                kind: "special file",
            })
        }
    }

    /// Whether an existing link value `points_to` refers to `source`.
    ///
    /// Relative link values are resolved against the link's own directory
    /// before comparing.
    #[must_use]
    pub fn points_to_source(&self, points_to: &Path) -> bool {
        let resolved = if points_to.is_relative() {
            let parent = self.target.parent().unwrap_or_else(|| Path::new(""));
            parent.join(points_to)
        } else {
            points_to.to_path_buf()
        };
        normalize(&resolved) == normalize(&self.source)
    }

    /// Create the symlink, creating parent directories as needed.
    ///
    /// The caller must have made sure nothing exists at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the link cannot be created.
    pub fn create(&self) -> Result<(), LinkError> {
        ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target).map_err(|source| LinkError::Create {
            link: self.target.clone(),
            target: self.source.clone(),
            source,
        })
    }

    /// Replace an existing symlink at `target` with one pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the old link cannot be removed or the new one
    /// cannot be created.
    pub fn relink(&self) -> Result<(), LinkError> {
        remove_symlink(&self.target).map_err(|source| LinkError::Remove {
            path: self.target.clone(),
            source,
        })?;
        self.create()
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)?;
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)?;
        } else {
            std::os::windows::fs::symlink_file(target, link)?;
        }
    }

    Ok(())
}

/// Remove a symlink without touching what it points to.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let meta = std::fs::symlink_metadata(path)?;
        if meta.file_attributes() & 0x10 != 0 {
            // FILE_ATTRIBUTE_DIRECTORY
            return std::fs::remove_dir(path);
        }
    }
    std::fs::remove_file(path)
}
