//! Application Layer
//!
//! Use cases that orchestrate the mirroring flow.
//! This layer:
//! - Wires the watcher, the coordinator and the sync engine
//! - Does NOT contain the change-detection or patching rules
//!
//! ## Use Cases
//!
//! - `MirrorUseCase` - Mirrors growing files into a replica until cancelled
//! - `watch_notifications` - Lists raw notifications for debugging

pub mod mirror;

pub use mirror::{watch_notifications, MirrorEvent, MirrorOptions, MirrorSummary, MirrorUseCase};
