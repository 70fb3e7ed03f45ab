//! Mirror Use Case implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{MirrorError, MirrorResult};
use crate::sync::{EngineOptions, ReplicaSyncEngine};
use crate::watcher::{handoff_queue, ChangeCoordinator, ChangeRecord, WatchTargets};

use super::event::{MirrorEvent, MirrorOptions};

/// Counters for one mirror run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Records taken off the queue
    pub records: usize,
    /// Records that carried no new bytes
    pub skipped: usize,
    /// Records refused as malformed
    pub rejected: usize,
    /// Drift repairs applied
    pub drift_repairs: usize,
    /// Running total when the mirror stopped
    pub total_size: u64,
}

/// Mirror Use Case
///
/// Wires the watcher, the change coordinator and the sync engine together.
/// This is the main entry point for the `filemirror file` command.
pub struct MirrorUseCase {
    options: MirrorOptions,
}

impl MirrorUseCase {
    pub fn new(options: MirrorOptions) -> Self {
        Self { options }
    }

    /// Validate targets, open the replica and register the watches.
    ///
    /// Everything that can fail before mirroring starts fails here.
    fn prepare(&self) -> MirrorResult<(WatchTargets, ReplicaSyncEngine)> {
        let targets = WatchTargets::new(&self.options.paths)?;
        let config = &self.options.config;
        let engine = ReplicaSyncEngine::open(
            &config.replica.path,
            EngineOptions {
                expected_total_size: config.verify.threshold(),
                lock: config.replica.lock,
            },
        )?;
        Ok((targets, engine))
    }

    /// Start mirroring (blocking)
    ///
    /// Runs until the running flag is cleared or a fatal I/O error occurs.
    /// Use the callback to receive events.
    pub fn start<F>(&self, running: Arc<AtomicBool>, on_event: F) -> MirrorResult<MirrorSummary>
    where
        F: Fn(MirrorEvent),
    {
        let (targets, mut engine) = self.prepare()?;

        // notify delivers events and errors on the same channel.
        let (event_tx, event_rx) = channel::<notify::Result<notify::Event>>();
        let mut watcher = RecommendedWatcher::new(event_tx, Config::default())
            .map_err(|source| MirrorError::WatcherSetup { source })?;

        let dirs = targets.parent_dirs();
        for dir in &dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| MirrorError::WatchFailed {
                    path: dir.clone(),
                    message: e.to_string(),
                })?;
        }

        let (record_tx, record_rx) = handoff_queue();
        let coordinator = ChangeCoordinator::new(targets.clone(), record_tx);
        let sizes = coordinator.state();
        let coordinator_handle = thread::Builder::new()
            .name("filemirror-coordinator".to_string())
            .spawn(move || coordinator.run(event_rx))?;

        on_event(MirrorEvent::Started {
            replica: engine.replica_path().display().to_string(),
            watching: targets
                .files()
                .iter()
                .map(|f| f.display().to_string())
                .collect(),
        });
        tracing::info!(watching = dirs.len(), "ready; press ^C to exit");

        let poll_interval = self.options.config.watch.poll_interval();
        let mut summary = MirrorSummary::default();

        while running.load(Ordering::SeqCst) {
            match record_rx.recv_timeout(poll_interval) {
                Ok(record) => self.process(&mut engine, &record, &mut summary, &on_event)?,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("change coordinator stopped");
                    break;
                }
            }
        }

        // Closing the watcher ends the coordinator loop; dropping the queue
        // first releases it if it is blocked on a send.
        drop(record_rx);
        drop(watcher);
        match coordinator_handle.join() {
            Ok(emitted) => tracing::debug!(
                emitted,
                consumed = summary.records,
                sizes = ?sizes.snapshot(),
                "change coordinator joined"
            ),
            Err(_) => tracing::error!("change coordinator panicked"),
        }

        summary.total_size = engine.total_size();
        on_event(MirrorEvent::Shutdown);
        Ok(summary)
    }

    fn process<F>(
        &self,
        engine: &mut ReplicaSyncEngine,
        record: &ChangeRecord,
        summary: &mut MirrorSummary,
        on_event: &F,
    ) -> MirrorResult<()>
    where
        F: Fn(MirrorEvent),
    {
        summary.records += 1;
        on_event(MirrorEvent::record(record));

        match engine.apply(record) {
            Ok(outcome) => {
                if outcome.skipped {
                    summary.skipped += 1;
                }
                if outcome.drift.is_some() {
                    summary.drift_repairs += 1;
                }
                for event in MirrorEvent::from_outcome(record, &outcome) {
                    on_event(event);
                }
                Ok(())
            }
            Err(e @ MirrorError::MalformedRecord { .. }) => {
                tracing::warn!(error = %e, "rejected change record");
                summary.rejected += 1;
                on_event(MirrorEvent::Rejected {
                    path: record.path.display().to_string(),
                    message: e.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                on_event(MirrorEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
