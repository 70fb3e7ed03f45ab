//! Mirror Use Case
//!
//! Continuous mirroring of one or more growing files into a replica.
//! It orchestrates:
//! - File system monitoring (via `notify`, parent directories only)
//! - The change coordinator thread producing change records
//! - The replica sync engine consuming them in order
//! - Cancellation through a shared running flag (Ctrl+C)
//!
//! ## Usage
//!
//! ```ignore
//! let options = MirrorOptions::new(paths).with_config(config);
//! let use_case = MirrorUseCase::new(options);
//! use_case.start(running, |event| { ... })?;
//! ```

mod event;
mod notifications;
mod use_case;


pub use event::{MirrorEvent, MirrorOptions};
pub use notifications::watch_notifications;
pub use use_case::{MirrorSummary, MirrorUseCase};
