use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use filemirror::application::watch_notifications;
use filemirror::config::DEFAULT_POLL_INTERVAL_MS;
use filemirror::MirrorEvent;

pub fn cmd_events(paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let running = super::running_flag()?;
    let poll_interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

    let seen = watch_notifications(&paths, running, poll_interval, |notification| {
        let event = MirrorEvent::notified(notification);
        if json {
            crate::ui::json::emit(&event);
        } else {
            print!("{}", crate::ui::views::mirror::render_mirror_event(&event));
        }
    })?;

    tracing::info!(seen, "stopped watching");
    Ok(())
}
