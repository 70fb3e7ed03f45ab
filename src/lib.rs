//! filemirror - incremental file mirroring driven by change notifications
//!
//! filemirror keeps a replica of a growing or rewritten file up to date by
//! reacting to filesystem notifications: each notification becomes a
//! byte-range delta, and each delta is applied to the replica after checking
//! (and patching) what the replica already holds.

pub mod application;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;
pub mod watcher;

// Re-exports for convenience
pub use application::{MirrorEvent, MirrorOptions, MirrorSummary, MirrorUseCase};
pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
pub use sync::{find_differences, ApplyOutcome, EngineOptions, ReplicaSyncEngine};
pub use watcher::{ChangeCoordinator, ChangeRecord, FileWatchState, WatchTargets};
