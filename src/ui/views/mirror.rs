use filemirror::MirrorEvent;

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

pub fn render_mirror_event(event: &MirrorEvent) -> String {
    render_mirror_event_at(&timestamp(), event)
}

pub fn render_mirror_event_at(timestamp: &str, event: &MirrorEvent) -> String {
    let prefix = format!("[{}]", timestamp);

    match event {
        MirrorEvent::Started { replica, watching } => format!(
            "{} Mirroring {} -> {} (press ^C to exit)\n",
            prefix,
            watching.join(", "),
            replica
        ),
        MirrorEvent::Notified { path, kind } => {
            format!("{} {:?} {}\n", prefix, kind, path)
        }
        MirrorEvent::Record {
            path,
            timestamp,
            file_size,
            delta_size,
            offset,
        } => format!(
            "{} {} {} {} modsize:{} offset:{}\n",
            prefix,
            path,
            file_size,
            timestamp.timestamp(),
            delta_size,
            offset
        ),
        MirrorEvent::Skipped { path, file_size } => {
            format!("{} {} unchanged at {} bytes\n", prefix, path, file_size)
        }
        MirrorEvent::Truncated { path, size } => {
            format!("{} {} shrank, replica cut to {} bytes\n", prefix, path, size)
        }
        MirrorEvent::DriftRepaired {
            differing,
            patch_offset,
            patch_len,
            ..
        } => format!(
            "{} Drift: {} differing bytes, patched {} bytes at {}\n",
            prefix, differing, patch_len, patch_offset
        ),
        MirrorEvent::Applied {
            bytes_written,
            total_size,
            ..
        } => format!(
            "{} Wrote {} bytes, total {} bytes\n",
            prefix, bytes_written, total_size
        ),
        MirrorEvent::Verified {
            total_size,
            matches,
            differing,
        } => {
            if *matches {
                format!("{} Verified: replica matches source ({} bytes)\n", prefix, total_size)
            } else {
                format!(
                    "{} Verify failed: {} differing bytes at total {}\n",
                    prefix, differing, total_size
                )
            }
        }
        MirrorEvent::Rejected { path, message } => {
            format!("{} Rejected {}: {}\n", prefix, path, message)
        }
        MirrorEvent::Error { message } => format!("{} Error: {}\n", prefix, message),
        MirrorEvent::Shutdown => format!("\n{} Mirror stopped.\n", prefix),
    }
}
