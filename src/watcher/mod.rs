//! Change detection for mirrored files
//!
//! Turns raw `notify` events into per-file byte-range deltas:
//! - Filtering to created/written events on the configured targets
//! - Per-file size bookkeeping (`FileWatchState`)
//! - Single-slot hand-off to the sync engine (blocking send)

mod coordinator;
mod notification;
mod record;
mod state;

pub use coordinator::{handoff_queue, ChangeCoordinator};
pub use notification::{Notification, NotificationKind, WatchTargets};
pub use record::{ChangeRecord, RecordKind};
pub use state::FileWatchState;
