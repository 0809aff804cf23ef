use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

pub const CONFIG_ENV_VAR: &str = "CINEVISION_CONFIG";
const CONFIG_FILE_NAME: &str = "config.json";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<config dir>/cinevision/config.json`, if it exists.
pub fn default_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("cinevision").join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// A config and the file it was read from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

/// Loads `path` if given, else the default location if present, else
/// built-in defaults.
///
/// Nothing is logged here; callers usually load config before logging is
/// set up and report `source` afterwards.
pub fn load_config_or_default(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Ok(LoadedConfig {
            config: load_config(&path)?,
            source: Some(path),
        }),
        None => Ok(LoadedConfig {
            config: Config::default(),
            source: None,
        }),
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.bind.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid bind address: {}", config.bind),
        });
    }

    if config.scratch_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "scratchRoot must not be empty".to_string(),
        });
    }

    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "maxBodyBytes must be greater than zero".to_string(),
        });
    }

    for (kind, command) in &config.workers {
        if command.program.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Worker '{}' has an empty program", kind),
            });
        }
    }

    Ok(())
}
