//! Configuration loading
//!
//! Resolution priority:
//! 1. Command-line arguments (highest priority, passed in as [`ConfigOverrides`])
//! 2. Environment variables (`OPENAI_*` for the LLM section; the binary maps
//!    `TABDECK_*` onto its command-line arguments)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing TOML file is not an error: the service starts on defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Backing file location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON document. Defaults to the platform data directory.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// LLM classification provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Overlay `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty_env("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(url) = non_empty_env("OPENAI_BASE_URL") {
            self.base_url = url;
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Command-line overrides (highest priority)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub log_level: String,
    pub llm: LlmConfig,
}

impl ServiceConfig {
    /// Merge TOML, environment and command-line sources
    pub fn resolve(toml_config: TomlConfig, overrides: ConfigOverrides) -> Self {
        let mut llm = toml_config.llm;
        llm.apply_env();

        let data_file = overrides
            .data_file
            .or(toml_config.storage.data_file)
            .unwrap_or_else(default_data_file);

        Self {
            host: overrides.host.unwrap_or(toml_config.server.host),
            port: overrides.port.unwrap_or(toml_config.server.port),
            data_file,
            log_level: overrides.log_level.unwrap_or(toml_config.logging.level),
            llm,
        }
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the bootstrap config came from.
///
/// Loading happens before the subscriber is installed, so the binary logs this
/// once tracing is up.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// The platform config file exists but could not be used
    Ignored { path: PathBuf, reason: String },
    /// No config file; compiled defaults
    Defaults,
}

/// Load the TOML config.
///
/// An explicitly requested file must exist and parse. Without one, the
/// platform config file is used if present, otherwise defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    load_toml_config_from(explicit, default_config_file())
}

fn load_toml_config_from(
    explicit: Option<&Path>,
    fallback: Option<PathBuf>,
) -> Result<(TomlConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = read_toml_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    match fallback {
        Some(path) if path.exists() => match read_toml_config(&path) {
            Ok(config) => Ok((config, ConfigSource::File(path))),
            Err(e) => Ok((
                TomlConfig::default(),
                ConfigSource::Ignored {
                    path,
                    reason: e.to_string(),
                },
            )),
        },
        _ => Ok((TomlConfig::default(), ConfigSource::Defaults)),
    }
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
}

/// Platform config file (`<config_dir>/tabdeck/config.toml`)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tabdeck").join("config.toml"))
}

/// Platform default document path (`<data_local_dir>/tabdeck/data.json`)
pub fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tabdeck"))
        .unwrap_or_else(|| PathBuf::from("./tabdeck_data"))
        .join("data.json")
}
