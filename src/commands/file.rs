use std::path::PathBuf;

use anyhow::Result;

use filemirror::config::MirrorConfig;
use filemirror::{MirrorOptions, MirrorUseCase};

pub struct FileArgs {
    pub paths: Vec<PathBuf>,
    pub replica: Option<PathBuf>,
    pub expected_size: Option<u64>,
    pub config: Option<PathBuf>,
    pub no_lock: bool,
}

fn load_config(args: &FileArgs) -> Result<MirrorConfig> {
    let (config, warnings) = MirrorConfig::load_or_default(args.config.as_deref())?;
    for warning in &warnings {
        tracing::warn!(key = %warning.key, file = %warning.file.display(), "unknown config key");
    }

    Ok(config
        .with_env_overrides()
        .with_replica(args.replica.clone())
        .with_expected_total_size(args.expected_size)
        .without_lock(args.no_lock))
}

pub fn cmd_file(args: FileArgs, json: bool) -> Result<()> {
    let config = load_config(&args)?;
    let options = MirrorOptions::new(args.paths).with_config(config);
    let running = super::running_flag()?;

    let summary = MirrorUseCase::new(options).start(running, |event| {
        if json {
            crate::ui::json::emit(&event);
        } else {
            print!("{}", crate::ui::views::mirror::render_mirror_event(&event));
        }
    })?;

    tracing::info!(
        records = summary.records,
        skipped = summary.skipped,
        rejected = summary.rejected,
        drift_repairs = summary.drift_repairs,
        total = summary.total_size,
        "mirror stopped"
    );
    Ok(())
}
