//! Replica sync engine
//!
//! Consumes change records one at a time, in queue order:
//! 1. Skip records with nothing new
//! 2. Read the new range from the source
//! 3. Compare the already-synchronized prefix with the replica
//! 4. Patch drift, then write the new range at its offset
//! 5. Verify the whole file once the expected total is reached

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{MirrorError, MirrorResult};
use crate::watcher::{ChangeRecord, RecordKind};

use super::drift::{find_differences, DriftRepair, Verification};
use super::range::{read_all, read_range, write_at};

/// Options for ReplicaSyncEngine
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Cumulative size that triggers the terminal verification
    pub expected_total_size: Option<u64>,
    /// Hold an exclusive advisory lock on the replica
    pub lock: bool,
}

/// Where the engine is in its per-record cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Init,
    Streaming,
    Patched,
    Verified,
}

/// What applying one record did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Record carried no new bytes
    pub skipped: bool,
    pub bytes_written: usize,
    pub drift: Option<DriftRepair>,
    /// Replica length after a truncate record
    pub truncated_to: Option<u64>,
    pub verification: Option<Verification>,
    /// Running total after this record
    pub total_size: u64,
}

/// Keeps one replica file in step with the records it is fed.
///
/// Only one engine may own a replica; with `lock` set a second engine on the
/// same path fails with `ReplicaLocked`.
pub struct ReplicaSyncEngine {
    replica_path: PathBuf,
    replica: File,
    options: EngineOptions,
    total_size: u64,
    phase: SyncPhase,
}

impl ReplicaSyncEngine {
    /// Open (or create) the replica for reading and positioned writes.
    ///
    /// Existing content is kept; anything that disagrees with the source is
    /// handled as drift on the first record.
    pub fn open(replica_path: impl Into<PathBuf>, options: EngineOptions) -> MirrorResult<Self> {
        let replica_path = replica_path.into();
        if let Some(parent) = replica_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MirrorError::file_io(parent, e))?;
        }

        let replica = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&replica_path)
            .map_err(|e| MirrorError::file_io(&replica_path, e))?;

        if options.lock && replica.try_lock_exclusive().is_err() {
            return Err(MirrorError::ReplicaLocked { path: replica_path });
        }

        Ok(Self {
            replica_path,
            replica,
            options,
            total_size: 0,
            phase: SyncPhase::Init,
        })
    }

    pub fn replica_path(&self) -> &Path {
        &self.replica_path
    }

    /// Sum of every delta applied so far
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Apply one record.
    ///
    /// A malformed record is rejected before any I/O. Every other error is
    /// a fatal I/O failure against the source or the replica.
    pub fn apply(&mut self, record: &ChangeRecord) -> MirrorResult<ApplyOutcome> {
        record.validate()?;

        if let RecordKind::Truncate { previous_size } = record.kind {
            return self.truncate(record, previous_size);
        }

        if record.delta_size == 0 {
            tracing::debug!(path = %record.path.display(), size = record.file_size, "no new bytes");
            return Ok(ApplyOutcome {
                skipped: true,
                total_size: self.total_size,
                ..ApplyOutcome::default()
            });
        }

        self.total_size += record.delta_size;
        let source_err = |e| MirrorError::file_io(&record.path, e);

        let source = File::open(&record.path).map_err(source_err)?;
        let data = read_range(&source, record.offset, record.delta_size).map_err(source_err)?;

        // Everything counted before this record should already be in the replica.
        let synced_len = self.total_size - record.delta_size;
        let synced = read_range(&source, 0, synced_len).map_err(source_err)?;
        let current = read_all(&self.replica).map_err(|e| self.replica_err(e))?;

        let drift = if synced != current {
            self.repair(&source, &record.path, &current, &synced)?
        } else {
            None
        };

        write_at(&self.replica, record.offset, &data).map_err(|e| self.replica_err(e))?;
        self.phase = if drift.is_some() {
            SyncPhase::Patched
        } else {
            SyncPhase::Streaming
        };

        tracing::info!(
            path = %record.path.display(),
            offset = record.offset,
            bytes = data.len(),
            total = self.total_size,
            "replica updated"
        );

        let verification = if self.options.expected_total_size == Some(self.total_size) {
            Some(self.verify(&record.path)?)
        } else {
            None
        };

        Ok(ApplyOutcome {
            skipped: false,
            bytes_written: data.len(),
            drift,
            truncated_to: None,
            verification,
            total_size: self.total_size,
        })
    }

    /// Copy one contiguous run from the source over the replica.
    fn repair(
        &self,
        source: &File,
        source_path: &Path,
        current: &[u8],
        synced: &[u8],
    ) -> MirrorResult<Option<DriftRepair>> {
        let differing = find_differences(current, synced);
        let Some(&first) = differing.first() else {
            return Ok(None);
        };

        let patch_offset = first as u64;
        let patch_len = differing.len() as u64;
        let patch = read_range(source, patch_offset, patch_len)
            .map_err(|e| MirrorError::file_io(source_path, e))?;
        write_at(&self.replica, patch_offset, &patch).map_err(|e| self.replica_err(e))?;

        tracing::warn!(
            path = %source_path.display(),
            differing = differing.len(),
            first = first,
            replica_len = current.len(),
            expected_len = synced.len(),
            "replica drift detected, patched from source"
        );

        Ok(Some(DriftRepair {
            bytes_patched: patch.len(),
            differing,
            patch_offset,
            patch_len,
        }))
    }

    /// Cut the replica back to a source that shrank.
    fn truncate(&mut self, record: &ChangeRecord, previous_size: u64) -> MirrorResult<ApplyOutcome> {
        self.replica
            .set_len(record.file_size)
            .map_err(|e| self.replica_err(e))?;
        self.total_size = self
            .total_size
            .saturating_sub(previous_size - record.file_size);
        self.phase = SyncPhase::Streaming;

        tracing::warn!(
            path = %record.path.display(),
            from = previous_size,
            to = record.file_size,
            total = self.total_size,
            "replica truncated"
        );

        Ok(ApplyOutcome {
            truncated_to: Some(record.file_size),
            total_size: self.total_size,
            ..ApplyOutcome::default()
        })
    }

    /// Whole-file comparison; reports only, repairs nothing.
    fn verify(&mut self, source_path: &Path) -> MirrorResult<Verification> {
        let source = std::fs::read(source_path).map_err(|e| MirrorError::file_io(source_path, e))?;
        let replica = read_all(&self.replica).map_err(|e| self.replica_err(e))?;
        let verification = Verification::new(self.total_size, &source, &replica);
        self.phase = SyncPhase::Verified;

        if verification.matches() {
            tracing::info!(
                total = self.total_size,
                digest = %verification.source_digest,
                "replica verified"
            );
        } else {
            tracing::warn!(
                total = self.total_size,
                differing = verification.differing.len(),
                first = ?verification.differing.first(),
                source_digest = %verification.source_digest,
                replica_digest = %verification.replica_digest,
                "replica differs from source after final record"
            );
        }

        Ok(verification)
    }

    fn replica_err(&self, e: std::io::Error) -> MirrorError {
        MirrorError::file_io(&self.replica_path, e)
    }
}

impl Drop for ReplicaSyncEngine {
    fn drop(&mut self) {
        if self.options.lock {
            let _ = FileExt::unlock(&self.replica);
        }
    }
}
