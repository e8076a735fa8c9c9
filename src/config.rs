use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "MEDIASYNC_CONFIG";

/// Environment variable that overrides the OMDb API key.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub omdb: OmdbConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory the category folders live in. Record keys are relative to it.
    #[serde(default = "default_library_root")]
    pub root: PathBuf,

    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Relative keys (`<category>/<name>`) that are never treated as media.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_library_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_categories() -> Vec<String> {
    vec!["TV".to_string(), "movies".to_string()]
}

fn default_ignore() -> Vec<String> {
    vec!["movies/subtitles".to_string(), "movies/old".to_string()]
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_library_root(),
            categories: default_categories(),
            ignore: default_ignore(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_omdb_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_file")]
    pub api_key_file: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay after each inserted record
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

fn default_omdb_endpoint() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_api_key_file() -> PathBuf {
    Config::config_dir().join("apikey")
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_pacing_ms() -> u64 {
    1000
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            endpoint: default_omdb_endpoint(),
            api_key: None,
            api_key_file: default_api_key_file(),
            timeout_secs: default_timeout_secs(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl OmdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Resolve the API key: environment first, then the inline value, then the key file.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }
        self.resolve_api_key_from_config()
    }

    fn resolve_api_key_from_config(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }

        let content = std::fs::read_to_string(&self.api_key_file).with_context(|| {
            format!(
                "Failed to read OMDb API key from {:?} (set {} or omdb.api_key instead)",
                self.api_key_file, API_KEY_ENV
            )
        })?;

        let key = content.trim_end().to_string();
        if key.is_empty() {
            bail!("OMDb API key file {:?} is empty", self.api_key_file);
        }
        Ok(key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediasync")
        .join("logs")
        .join("mediasync.log")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediasync")
        .join("media.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            library: LibraryConfig::default(),
            omdb: OmdbConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load a config file, writing the defaults there first if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::parse_file(path)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Like [`Config::load`], but falls back to defaults without writing anything.
    pub fn read() -> Result<Self> {
        Self::read_from(&Self::config_path())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::parse_file(path)
        } else {
            Ok(Config::default())
        }
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediasync")
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }
}
