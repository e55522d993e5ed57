//! Configuration loading from file system

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use super::types::{expand_tilde, storybook_dir, StorybookConfig};
use crate::error::{Result, StorybookError};

/// Config file location: `$STORYBOOK_CONFIG`, else `~/.storybook/config.json`.
pub fn config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => expand_tilde(&path),
        _ => storybook_dir().join(CONFIG_FILE_NAME),
    }
}

/// Load configuration from the default location.
///
/// Returns `StorybookConfig::default()` if the file is missing or invalid.
#[instrument(name = "load_config")]
pub fn load_config() -> StorybookConfig {
    let path = config_path();
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return StorybookConfig::default();
    }
    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            StorybookConfig::default()
        }
    }
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<StorybookConfig> {
    let content = fs::read_to_string(path).map_err(|source| StorybookError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: StorybookConfig = serde_json::from_str(&content).map_err(|e| {
        let hint = if e.to_string().contains("unknown variant") {
            " (storySort.method must be \"configure\" or \"alphabetical\")"
        } else {
            ""
        };
        StorybookError::Config(format!("{}: {}{}", path.display(), e, hint))
    })?;
    info!(
        path = %path.display(),
        sort_method = ?config.story_sort.method,
        "Successfully loaded config"
    );
    Ok(config)
}
