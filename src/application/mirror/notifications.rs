//! Raw notification listing (the `events` command)

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{MirrorError, MirrorResult};
use crate::watcher::Notification;

/// Print every notification for the given paths until `running` is cleared.
///
/// Paths may be files or directories and are watched directly. Returns the
/// number of notifications seen.
pub fn watch_notifications<F>(
    paths: &[PathBuf],
    running: Arc<AtomicBool>,
    poll_interval: Duration,
    on_notification: F,
) -> MirrorResult<usize>
where
    F: Fn(&Notification),
{
    if paths.is_empty() {
        return Err(MirrorError::NoTargets);
    }

    let (tx, rx) = channel::<notify::Result<notify::Event>>();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())
        .map_err(|source| MirrorError::WatcherSetup { source })?;
    for path in paths {
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| MirrorError::WatchFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
    }

    let mut seen = 0;
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(poll_interval) {
            Ok(Ok(event)) => {
                for notification in Notification::from_event(&event) {
                    seen += 1;
                    on_notification(&notification);
                }
            }
            Ok(Err(e)) => tracing::error!(error = %e, "watcher error"),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(seen)
}
