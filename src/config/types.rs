//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MirrorResult;

use super::loader::{self, ConfigWarning};

/// Replica written when nothing else is configured
pub const DEFAULT_REPLICA_PATH: &str = "mirror.out";

/// How often the consume loop re-checks the cancellation flag
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Depth of the coordinator -> engine hand-off queue.
///
/// Not configurable: a single slot is what makes the coordinator block
/// until the engine has drained the previous record.
pub const QUEUE_CAPACITY: usize = 1;

/// Destination replica configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaConfig {
    #[serde(default = "default_replica_path")]
    pub path: PathBuf,

    /// Take an exclusive advisory lock on the replica while mirroring
    #[serde(default = "default_true")]
    pub lock: bool,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            path: default_replica_path(),
            lock: true,
        }
    }
}

fn default_replica_path() -> PathBuf {
    PathBuf::from(DEFAULT_REPLICA_PATH)
}

fn default_true() -> bool {
    true
}

/// Terminal verification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifyConfig {
    /// Cumulative byte count that triggers the final whole-file comparison
    #[serde(default)]
    pub expected_total_size: Option<u64>,
}

impl VerifyConfig {
    /// Expected total, treating 0 as disabled
    pub fn threshold(&self) -> Option<u64> {
        self.expected_total_size.filter(|size| *size > 0)
    }
}

/// Watch loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    #[serde(default)]
    pub replica: ReplicaConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl MirrorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> MirrorResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> MirrorResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit file, the user config, or defaults
    pub fn load_or_default(explicit: Option<&Path>) -> MirrorResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(explicit)
    }

    /// Apply environment variable overrides (FILEMIRROR_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }

    /// Replica path with CLI override applied
    pub fn with_replica(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.replica.path = path;
        }
        self
    }

    /// Expected total size with CLI override applied
    pub fn with_expected_total_size(mut self, size: Option<u64>) -> Self {
        if size.is_some() {
            self.verify.expected_total_size = size;
        }
        self
    }

    /// Disable the replica lock
    pub fn without_lock(mut self, no_lock: bool) -> Self {
        if no_lock {
            self.replica.lock = false;
        }
        self
    }
}
