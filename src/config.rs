use crate::generator::{self, GeneratorConfig};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const CONFIG_ENV: &str = "KEYNEST_CONFIG";
const APP_DIR: &str = "keynest";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub enum ConfigError {
    ConfigDirUnavailable,
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    InvalidGenerator(generator::GenerationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigDirUnavailable => {
                write!(f, "unable to determine configuration directory")
            }
            ConfigError::Io(err) => write!(f, "filesystem error: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
            ConfigError::Serialize(err) => write!(f, "failed to serialize config: {err}"),
            ConfigError::InvalidGenerator(err) => write!(f, "invalid generator settings: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
            ConfigError::InvalidGenerator(err) => Some(err),
            ConfigError::ConfigDirUnavailable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Allow the master password to be taken from the session environment
    /// instead of prompting. Off unless the user opts in.
    #[serde(default)]
    pub remember_master_password: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub security: SecuritySettings,
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let mut dir = config_dir().ok_or(ConfigError::ConfigDirUnavailable)?;
    dir.push(APP_DIR);
    dir.push(CONFIG_FILE_NAME);
    Ok(dir)
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path()?)
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    generator::validate_config(&settings.generator).map_err(ConfigError::InvalidGenerator)?;

    let path = config_path()?;
    persist_settings(&path, settings)?;
    Ok(path)
}

fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(ConfigError::Parse),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file; using defaults");
            Ok(Settings::default())
        }
        Err(err) => Err(ConfigError::Io(err)),
    }
}

fn persist_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(ConfigError::Io)?;
    }

    let toml = toml::to_string_pretty(settings).map_err(ConfigError::Serialize)?;
    let mut temp = NamedTempFile::new_in(&parent).map_err(ConfigError::Io)?;
    temp.write_all(toml.as_bytes()).map_err(ConfigError::Io)?;
    temp.flush().map_err(ConfigError::Io)?;
    temp.persist(path)
        .map_err(|err| ConfigError::Io(err.error))?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}
