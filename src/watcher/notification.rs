//! Notifications and watch targets

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use serde::Serialize;

use crate::error::{MirrorError, MirrorResult};

/// Change kinds the coordinator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Written,
    Other,
}

impl NotificationKind {
    /// Only created and written files can carry new bytes
    pub fn is_content_change(self) -> bool {
        matches!(self, NotificationKind::Created | NotificationKind::Written)
    }
}

impl From<&EventKind> for NotificationKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => NotificationKind::Created,
            // Polling and kqueue backends cannot always tell data from metadata.
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                NotificationKind::Written
            }
            // A file renamed onto a target replaces it, same as a create.
            EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::Both | RenameMode::Any,
            )) => NotificationKind::Created,
            _ => NotificationKind::Other,
        }
    }
}

/// A single (path, kind) change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub path: PathBuf,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(path: impl Into<PathBuf>, kind: NotificationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a `notify` event into one notification per path.
    ///
    /// A paired rename (`[from, to]`) only yields its destination.
    pub fn from_event(event: &Event) -> Vec<Notification> {
        let kind = NotificationKind::from(&event.kind);
        let paths = match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                &event.paths[1..]
            }
            _ => &event.paths[..],
        };
        paths
            .iter()
            .map(|path| Notification::new(path.clone(), kind))
            .collect()
    }
}

/// Validated set of files to mirror.
///
/// Files are watched through their parent directory so rename-based saves
/// keep producing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTargets {
    files: Vec<PathBuf>,
}

impl WatchTargets {
    /// Validate and canonicalize the given paths.
    ///
    /// Fails on an empty list, a missing path or a directory.
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> MirrorResult<Self> {
        if paths.is_empty() {
            return Err(MirrorError::NoTargets);
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let meta = std::fs::symlink_metadata(path).map_err(|source| {
                MirrorError::TargetNotFound {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            if meta.is_dir() {
                return Err(MirrorError::IsDirectory {
                    path: path.to_path_buf(),
                });
            }

            // Event paths are reported under the canonical parent directory.
            let canonical = path
                .canonicalize()
                .map_err(|source| MirrorError::TargetNotFound {
                    path: path.to_path_buf(),
                    source,
                })?;
            if !files.contains(&canonical) {
                files.push(canonical);
            }
        }

        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Linear scan; target lists are small.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Deduplicated parent directories to register with the watcher
    pub fn parent_dirs(&self) -> Vec<PathBuf> {
        let dirs: BTreeSet<PathBuf> = self
            .files
            .iter()
            .map(|f| {
                f.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .collect();
        dirs.into_iter().collect()
    }
}
