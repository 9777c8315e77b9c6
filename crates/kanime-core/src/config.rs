use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KanimeError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub sfw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: u32,
    pub home_page_size: u32,
    pub schedule_page_size: u32,
    pub section_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Also write a daily-rolling log file under the data directory.
    pub file: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".into(),
            timeout_secs: 15,
            sfw: true,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 24,
            home_page_size: 12,
            schedule_page_size: 25,
            section_size: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "kanime=info".into(),
            file: false,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl AppConfig {
    /// Load config: user file (if exists) merged over built-in defaults.
    pub fn load() -> Result<Self, KanimeError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::from_toml(&user_str)
        } else {
            Self::from_toml(DEFAULT_CONFIG)
        }
    }

    /// Missing keys and sections take their default values.
    pub fn from_toml(source: &str) -> Result<Self, KanimeError> {
        toml::from_str(source).map_err(|e| KanimeError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<PathBuf, KanimeError> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), KanimeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KanimeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory holding the durable key-value blobs.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kanime")
    }
}
