//! Per-entry state machine: inspect the destination, then skip, relink, or
//! back up and create.
use std::path::Path;

use super::LinkEngine;
use super::outcome::{LinkOutcome, LinkStatus};
use crate::error::LinkError;
use crate::index::Entry;
use crate::resources::TargetState;
use crate::resources::fs::{absolutize, join_under, normalize, relative_to};
use crate::resources::symlink::SymlinkResource;

impl LinkEngine {
    /// Absolute source and destination paths for `entry`.
    ///
    /// Both index paths stay anchored to their roots even when written as
    /// absolute paths.
    pub(super) fn symlink_for(&self, entry: &Entry) -> Result<SymlinkResource, LinkError> {
        let joined = join_under(&self.source_root, &entry.source);
        let source = absolutize(&joined).map_err(|source| LinkError::Absolutize {
            path: joined.clone(),
            source,
        })?;
        let name = source
            .file_name()
            .ok_or_else(|| LinkError::NoFileName {
                path: source.clone(),
            })?
            .to_os_string();
        let mut target = join_under(&self.dest_root, &entry.dest_dir);
        target.push(name);
        let link = SymlinkResource::new(source, normalize(&target));
        tracing::debug!("link {}", link.description());
        Ok(link)
    }

    /// Apply `entry` and return what happened.
    pub(super) fn link_entry(&self, entry: &Entry) -> Result<LinkOutcome, LinkError> {
        let link = self.symlink_for(entry)?;
        warn_if_source_missing(&link.source);

        let (status, backed_up) = match link.current_state()? {
            TargetState::Symlink { points_to } if link.points_to_source(&points_to) => {
                (LinkStatus::AlreadyLinked, false)
            }
            TargetState::Symlink { points_to } => {
                tracing::debug!(
                    "replacing {} (was -> {})",
                    link.target.display(),
                    points_to.display()
                );
                link.relink()?;
                (LinkStatus::LinkUpdated, false)
            }
            TargetState::RegularFile => {
                self.backups.backup_file(&link.target)?;
                link.create()?;
                if self.keep_max_count > 0 {
                    self.backups.prune(self.keep_max_count);
                }
                (LinkStatus::LinkCreated, true)
            }
            TargetState::Absent => {
                link.create()?;
                (LinkStatus::LinkCreated, false)
            }
            TargetState::Unsupported { kind } => {
                return Err(LinkError::UnsupportedTarget {
                    path: link.target,
                    kind,
                });
            }
        };
        Ok(self.outcome(link, status, backed_up))
    }

    /// Inspect `entry` and return what [`link_entry`](Self::link_entry)
    /// would do, without touching the filesystem.
    pub(super) fn plan_entry(&self, entry: &Entry) -> Result<LinkOutcome, LinkError> {
        let link = self.symlink_for(entry)?;
        warn_if_source_missing(&link.source);

        let (status, backed_up) = match link.current_state()? {
            TargetState::Symlink { points_to } if link.points_to_source(&points_to) => {
                (LinkStatus::AlreadyLinked, false)
            }
            TargetState::Symlink { .. } => (LinkStatus::LinkUpdated, false),
            TargetState::RegularFile => (LinkStatus::LinkCreated, true),
            TargetState::Absent => (LinkStatus::LinkCreated, false),
            TargetState::Unsupported { kind } => {
                return Err(LinkError::UnsupportedTarget {
                    path: link.target,
                    kind,
                });
            }
        };
        Ok(self.outcome(link, status, backed_up))
    }

    fn outcome(&self, link: SymlinkResource, status: LinkStatus, backed_up: bool) -> LinkOutcome {
        LinkOutcome {
            status,
            backed_up,
            relative_path: relative_to(&link.target, &self.dest_root),
            destination: link.target,
        }
    }
}

/// A dangling link is still created, but worth a note.
fn warn_if_source_missing(source: &Path) {
    if source.symlink_metadata().is_err() {
        tracing::warn!("source does not exist: {}", source.display());
    }
}
