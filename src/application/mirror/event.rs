//! Mirror event types and options

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::config::MirrorConfig;
use crate::sync::ApplyOutcome;
use crate::watcher::{ChangeRecord, Notification, NotificationKind};

/// Mirror options
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Files to mirror
    pub paths: Vec<PathBuf>,
    /// Replica, verification and loop settings
    pub config: MirrorConfig,
}

impl MirrorOptions {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            config: MirrorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MirrorConfig) -> Self {
        self.config = config;
        self
    }
}

/// Mirror event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MirrorEvent {
    /// Watches are registered
    Started {
        replica: String,
        watching: Vec<String>,
    },
    /// Raw notification (events command)
    Notified {
        path: String,
        kind: NotificationKind,
    },
    /// Change record taken off the queue
    Record {
        path: String,
        timestamp: DateTime<Utc>,
        file_size: u64,
        delta_size: u64,
        offset: u64,
    },
    /// Record had no new bytes
    Skipped { path: String, file_size: u64 },
    /// Replica cut back after the source shrank
    Truncated { path: String, size: u64 },
    /// Replica prefix disagreed with the source and was patched
    DriftRepaired {
        path: String,
        differing: usize,
        patch_offset: u64,
        patch_len: u64,
    },
    /// New range written
    Applied {
        path: String,
        bytes_written: usize,
        total_size: u64,
    },
    /// Whole-file comparison at the expected total size
    Verified {
        total_size: u64,
        matches: bool,
        differing: usize,
    },
    /// Record refused without touching the replica
    Rejected { path: String, message: String },
    /// Fatal error
    Error { message: String },
    /// Mirror stopped
    Shutdown,
}

impl MirrorEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub(crate) fn record(record: &ChangeRecord) -> Self {
        MirrorEvent::Record {
            path: record.path.display().to_string(),
            timestamp: record.timestamp,
            file_size: record.file_size,
            delta_size: record.delta_size,
            offset: record.offset,
        }
    }

    pub fn notified(notification: &Notification) -> Self {
        MirrorEvent::Notified {
            path: notification.path.display().to_string(),
            kind: notification.kind,
        }
    }

    /// Events describing what one applied record did, in order
    pub(crate) fn from_outcome(record: &ChangeRecord, outcome: &ApplyOutcome) -> Vec<Self> {
        let path = record.path.display().to_string();
        let mut events = Vec::new();

        if outcome.skipped {
            events.push(MirrorEvent::Skipped {
                path,
                file_size: record.file_size,
            });
            return events;
        }

        if let Some(size) = outcome.truncated_to {
            events.push(MirrorEvent::Truncated { path, size });
            return events;
        }

        if let Some(drift) = &outcome.drift {
            events.push(MirrorEvent::DriftRepaired {
                path: path.clone(),
                differing: drift.differing.len(),
                patch_offset: drift.patch_offset,
                patch_len: drift.patch_len,
            });
        }

        events.push(MirrorEvent::Applied {
            path,
            bytes_written: outcome.bytes_written,
            total_size: outcome.total_size,
        });

        if let Some(verification) = &outcome.verification {
            events.push(MirrorEvent::Verified {
                total_size: verification.total_size,
                matches: verification.matches(),
                differing: verification.differing.len(),
            });
        }

        events
    }
}
