//! Normalized change records

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use crate::error::{MirrorError, MirrorResult};

/// What the observed size change means for the replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// File grew (or stayed the same size)
    Append,
    /// File shrank from `previous_size`; the replica is cut back to `file_size`
    Truncate { previous_size: u64 },
}

/// One byte-range delta observed for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: PathBuf,
    /// Source modification time at observation
    pub timestamp: DateTime<Utc>,
    pub file_size: u64,
    pub delta_size: u64,
    pub offset: u64,
    pub kind: RecordKind,
}

impl ChangeRecord {
    /// Record for a file that grew from `last_size` to `file_size`
    pub fn append(
        path: impl Into<PathBuf>,
        timestamp: DateTime<Utc>,
        last_size: u64,
        file_size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            timestamp,
            file_size,
            delta_size: file_size.saturating_sub(last_size),
            offset: last_size.min(file_size),
            kind: RecordKind::Append,
        }
    }

    /// Record for a file that shrank to `file_size`
    pub fn truncate(
        path: impl Into<PathBuf>,
        timestamp: DateTime<Utc>,
        previous_size: u64,
        file_size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            timestamp,
            file_size,
            delta_size: 0,
            offset: file_size,
            kind: RecordKind::Truncate { previous_size },
        }
    }

    /// Nothing new to copy
    pub fn is_noop(&self) -> bool {
        self.delta_size == 0 && self.kind == RecordKind::Append
    }

    /// Check that the range ends exactly at the observed file size.
    pub fn validate(&self) -> MirrorResult<()> {
        let end = self.offset.checked_add(self.delta_size);
        let well_formed = match self.kind {
            RecordKind::Append => end == Some(self.file_size),
            RecordKind::Truncate { previous_size } => {
                self.delta_size == 0
                    && self.offset == self.file_size
                    && previous_size > self.file_size
            }
        };

        if well_formed {
            Ok(())
        } else {
            Err(MirrorError::MalformedRecord {
                path: self.path.clone(),
                offset: self.offset,
                delta_size: self.delta_size,
                file_size: self.file_size,
            })
        }
    }
}
