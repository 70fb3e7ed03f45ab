//! Change coordinator: notifications in, change records out

use std::fs::File;
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use notify::Event;

use crate::config::QUEUE_CAPACITY;
use crate::error::{MirrorError, MirrorResult};

use super::notification::{Notification, WatchTargets};
use super::record::ChangeRecord;
use super::state::FileWatchState;

/// Single-slot queue between the coordinator and the sync engine.
///
/// `send` blocks while the previous record has not been taken.
pub fn handoff_queue() -> (SyncSender<ChangeRecord>, Receiver<ChangeRecord>) {
    sync_channel(QUEUE_CAPACITY)
}

/// Size and mtime of a file that could be opened
struct Observation {
    size: u64,
    modified: DateTime<Utc>,
}

/// Open the file read-only and stat it.
///
/// `None` when the file cannot be opened (e.g. mid rename-save); a failed
/// stat still counts as an observation of size 0.
fn observe(path: &Path) -> Option<Observation> {
    let file = File::open(path).ok()?;
    let observation = match file.metadata() {
        Ok(meta) => Observation {
            size: meta.len(),
            modified: meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| DateTime::<Utc>::from(UNIX_EPOCH)),
        },
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "stat failed, assuming size 0");
            Observation {
                size: 0,
                modified: DateTime::<Utc>::from(UNIX_EPOCH),
            }
        }
    };
    Some(observation)
}

/// Translates path-level notifications into per-file byte-range records.
pub struct ChangeCoordinator {
    targets: WatchTargets,
    state: Arc<FileWatchState>,
    tx: SyncSender<ChangeRecord>,
    accepted: usize,
}

impl ChangeCoordinator {
    /// Create a coordinator with every target's size seeded to 0
    pub fn new(targets: WatchTargets, tx: SyncSender<ChangeRecord>) -> Self {
        let state = Arc::new(FileWatchState::new(targets.files()));
        Self {
            targets,
            state,
            tx,
            accepted: 0,
        }
    }

    /// Shared handle to the size bookkeeping
    pub fn state(&self) -> Arc<FileWatchState> {
        Arc::clone(&self.state)
    }

    /// Number of notifications turned into records so far
    pub(crate) fn accepted(&self) -> usize {
        self.accepted
    }

    /// Handle one notification.
    ///
    /// Returns `Ok(true)` when a record was emitted, `Ok(false)` when the
    /// notification was filtered out or the file could not be opened, and
    /// `Err(QueueClosed)` once the engine is gone. Blocks while the queue
    /// slot is occupied.
    pub fn on_notification(&mut self, notification: &Notification) -> MirrorResult<bool> {
        if !notification.kind.is_content_change() || !self.targets.contains(&notification.path) {
            return Ok(false);
        }

        let path = &notification.path;
        let Some(observation) = observe(path) else {
            tracing::debug!(path = %path.display(), "file not readable, waiting for next event");
            return Ok(false);
        };

        let last_size = self.state.last_known(path);
        let record = if observation.size < last_size {
            tracing::warn!(
                path = %path.display(),
                previous = last_size,
                size = observation.size,
                "source shrank, truncating replica"
            );
            ChangeRecord::truncate(path, observation.modified, last_size, observation.size)
        } else {
            ChangeRecord::append(path, observation.modified, last_size, observation.size)
        };

        self.accepted += 1;
        tracing::trace!(
            n = self.accepted,
            path = %path.display(),
            kind = ?notification.kind,
            size = record.file_size,
            delta = record.delta_size,
            offset = record.offset,
            "notification accepted"
        );

        // The size map is not locked while the send blocks.
        self.tx.send(record).map_err(|_| MirrorError::QueueClosed)?;
        self.state.record(path, observation.size);
        Ok(true)
    }

    /// Consume watcher output until the channel closes.
    ///
    /// Watcher errors are logged and skipped. The loop also ends when the
    /// engine drops its end of the queue. Returns the number of records
    /// emitted.
    pub fn run(mut self, events: Receiver<notify::Result<Event>>) -> usize {
        for res in events {
            match res {
                Ok(event) => {
                    for notification in Notification::from_event(&event) {
                        if let Err(MirrorError::QueueClosed) = self.on_notification(&notification)
                        {
                            tracing::debug!("sync engine gone, stopping coordinator");
                            return self.accepted;
                        }
                    }
                }
                Err(e) => tracing::error!(error = %e, "watcher error"),
            }
        }
        tracing::debug!(accepted = self.accepted, "watcher closed, coordinator exiting");
        self.accepted
    }
}
