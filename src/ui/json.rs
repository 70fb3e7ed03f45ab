use std::io::{self, Write};

use filemirror::MirrorEvent;

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &MirrorEvent) -> io::Result<()> {
    out.write_all(event.to_json().as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Convenience helper that writes to stdout.
///
/// A closed stdout (e.g. piped into `head`) is not worth stopping the mirror for.
pub fn emit(event: &MirrorEvent) {
    let mut out = io::stdout().lock();
    if let Err(e) = write_event(&mut out, event) {
        tracing::debug!(error = %e, "could not write event");
    }
}
