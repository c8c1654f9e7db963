use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CATALOG_URL: &str = "https://www.themealdb.com/api/json/v1/1/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => format!("Could not read {}", path.display()),
            ConfigError::Parse { path, source } => {
                format!("{} is not valid TOML: {}", path.display(), source.message())
            }
        }
    }
}

/// Runtime settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub catalog_url: String,
    /// Recipes requested by the explore view when no category is active.
    pub random_count: usize,
    pub request_timeout_secs: u64,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            random_count: 12,
            request_timeout_secs: 30,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "clickandcook", "click-and-cook")
}

/// `config.toml` in the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Log file used when neither the config nor the CLI names one.
pub fn default_log_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("click-and-cook.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("click-and-cook.log"))
}

impl Settings {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(default_log_path)
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}
