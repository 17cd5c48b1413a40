//! Config file loader.

use super::AppConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the optional override file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gpu-setup/config.json";

/// Environment variable that points at an alternative override file.
pub const CONFIG_PATH_ENV: &str = "GPU_SETUP_CONFIG";

/// Resolve the override file path: `$GPU_SETUP_CONFIG` or the default.
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Load the configuration from the resolved override path.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_file(&config_path())
}

/// Load config from a JSON file, falling back to defaults when it is absent.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(e) => return Err(ConfigError::IoError(e)),
    };

    let config: AppConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;

    validate_config(&config)?;
    log::debug!("Loaded config overrides from {}", path.display());
    Ok(config)
}

/// Reject configurations that would make the tool unusable.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.log_file_name.is_empty() || config.log_file_name.contains('/') {
        return Err(ConfigError::ValidationFailed(format!(
            "log_file_name must be a plain file name, got '{}'",
            config.log_file_name
        )));
    }

    if !config.log_dir.is_absolute() {
        return Err(ConfigError::ValidationFailed(format!(
            "log_dir must be absolute, got {}",
            config.log_dir.display()
        )));
    }

    if !config.install_path.is_absolute() {
        return Err(ConfigError::ValidationFailed(format!(
            "install_path must be absolute, got {}",
            config.install_path.display()
        )));
    }

    if config.amd.monitor_command.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "amd.monitor_command cannot be empty".to_string(),
        ));
    }

    Ok(())
}
