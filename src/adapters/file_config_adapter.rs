//! INI file configuration adapter.

use crate::domain::cache::CacheConfig;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_DIR: &str = ".liquidity/cache";
pub const DEFAULT_DATA_DIR: &str = "data";

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Empty configuration: every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    /// `[cache]` section: `enabled` and `data_dir`.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.get_bool("cache", "enabled", true),
            data_dir: PathBuf::from(
                self.get_string("cache", "data_dir")
                    .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string()),
            ),
        }
    }

    /// `[data] dir`: root of the local provider's CSV tree.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(
            self.get_string("data", "dir")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        )
    }

    /// `[provider] api_key`: opaque to the core, consumed by upstream
    /// provider adapters.
    pub fn api_key(&self) -> Option<String> {
        self.get_string("provider", "api_key")
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}
