//! Error types for filemirror
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filemirror operations
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Main error type for filemirror operations
#[derive(Error, Debug)]
pub enum MirrorError {
    /// No files were given to watch
    #[error("must specify at least one file to watch")]
    NoTargets,

    /// Watch target does not exist or cannot be stat'ed
    #[error("{path}: {source}")]
    TargetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Watch target is a directory
    #[error("{path:?} is a directory, not a file")]
    IsDirectory { path: PathBuf },

    /// Parent directory of a target could not be watched
    #[error("{path:?}: {message}")]
    WatchFailed { path: PathBuf, message: String },

    /// Notification backend could not be created
    #[error("creating a new watcher: {source}")]
    WatcherSetup {
        #[source]
        source: notify::Error,
    },

    /// IO error against a known file (source or replica)
    #[error("IO error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Change record whose range does not end at the observed file size
    #[error(
        "malformed change record for {path}: offset {offset} + delta {delta_size} != size {file_size}"
    )]
    MalformedRecord {
        path: PathBuf,
        offset: u64,
        delta_size: u64,
        file_size: u64,
    },

    /// Sync engine stopped consuming change records
    #[error("change record queue closed")]
    QueueClosed,

    /// Replica is already locked by another engine
    #[error("replica {path} is locked by another filemirror process")]
    ReplicaLocked { path: PathBuf },

    /// Config file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },
}

impl MirrorError {
    /// Wrap an IO error with the path it happened on
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Errors raised while validating input before any watching starts.
    ///
    /// These are reported with the usage text and exit code 2.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MirrorError::NoTargets
                | MirrorError::TargetNotFound { .. }
                | MirrorError::IsDirectory { .. }
                | MirrorError::WatchFailed { .. }
                | MirrorError::WatcherSetup { .. }
                | MirrorError::InvalidConfig { .. }
                | MirrorError::ReplicaLocked { .. }
        )
    }
}
