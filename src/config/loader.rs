//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MirrorError, MirrorResult};

use super::types::MirrorConfig;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> MirrorResult<(MirrorConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| MirrorError::file_io(path, e))?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: MirrorConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| MirrorError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| ConfigWarning {
            key,
            file: path.to_path_buf(),
        })
        .collect();

    Ok((config, warnings))
}

/// Load from an explicit file, then the user config, then defaults.
///
/// An explicit file that fails to load is an error; a broken user config is not.
pub fn load_or_default(explicit: Option<&Path>) -> MirrorResult<(MirrorConfig, Vec<ConfigWarning>)> {
    if let Some(path) = explicit {
        return load_with_warnings(path);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            match load_with_warnings(&user_config) {
                Ok(loaded) => return Ok(loaded),
                Err(e) => tracing::warn!(error = %e, "ignoring user config"),
            }
        }
    }

    Ok((MirrorConfig::default(), Vec::new()))
}

/// Apply environment variable overrides (FILEMIRROR_* prefix)
pub fn with_env_overrides(
    mut config: MirrorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> MirrorConfig {
    // FILEMIRROR_REPLICA
    if let Some(path) = lookup("FILEMIRROR_REPLICA") {
        if !path.trim().is_empty() {
            config.replica.path = PathBuf::from(path);
        }
    }

    // FILEMIRROR_EXPECTED_SIZE
    if let Some(size) = lookup("FILEMIRROR_EXPECTED_SIZE") {
        match size.trim().parse::<u64>() {
            Ok(size) => config.verify.expected_total_size = Some(size),
            Err(_) => tracing::warn!(value = %size, "FILEMIRROR_EXPECTED_SIZE is not a byte count"),
        }
    }

    // FILEMIRROR_LOCK_REPLICA
    if let Some(val) = lookup("FILEMIRROR_LOCK_REPLICA") {
        config.replica.lock = val.to_lowercase() != "false" && val != "0";
    }

    config
}

/// User config location (`<config_dir>/filemirror/config.toml`)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("filemirror").join("config.toml"))
}
