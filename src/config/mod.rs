//! Configuration module for filemirror
//!
//! Configuration hierarchy (highest priority first):
//! 1. CLI flags
//! 2. Environment variables (FILEMIRROR_*)
//! 3. Explicit config file (`--config`)
//! 4. User config (~/.config/filemirror/config.toml)
//! 5. Built-in defaults

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{
    MirrorConfig, ReplicaConfig, VerifyConfig, WatchConfig, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_REPLICA_PATH, QUEUE_CAPACITY,
};
