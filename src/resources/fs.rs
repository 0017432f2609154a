//! File-system path helpers shared by the link and backup primitives.
use std::path::{Component, Path, PathBuf};

use crate::error::LinkError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), LinkError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| LinkError::CreateParent {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Lexically clean `path`: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem or follow symlinks.
///
/// # Examples
///
/// ```
/// use flexdot_cli::resources::fs::normalize;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize(Path::new("/home/u/./a/../b")), PathBuf::from("/home/u/b"));
/// assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
/// assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
/// ```
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Make `path` absolute against the current directory and clean it
/// lexically. Symlinks are not resolved.
///
/// # Errors
///
/// Returns an error if the path is empty or the current directory cannot
/// be determined.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

/// Join `rel` onto `root` so the result never discards `root`.
///
/// Root and prefix components of `rel` are dropped, so an absolute `rel`
/// is treated as relative to `root`. `..` components are kept.
///
/// ```
/// use flexdot_cli::resources::fs::join_under;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(join_under(Path::new("/home/u"), Path::new("/etc")), PathBuf::from("/home/u/etc"));
/// assert_eq!(join_under(Path::new("/home/u"), Path::new("../opt")), PathBuf::from("/home/u/../opt"));
/// ```
#[must_use]
pub fn join_under(root: &Path, rel: &Path) -> PathBuf {
    let mut out = root.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => out.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Express `path` relative to `base`, walking up with `..` when `path`
/// lies outside it. Falls back to `path` when no relative form exists.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
