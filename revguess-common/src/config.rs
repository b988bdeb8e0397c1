//! Configuration loading and resolution
//!
//! Bootstrap settings come from a TOML file located in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `REVGUESS_CONFIG` environment variable
//! 3. `<config_dir>/revguess/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must load. A missing file at the
//! implicit location is not an error: a warning is logged and the compiled
//! defaults are used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{CatalogFetcher, FileFetcher, HttpFetcher};
use crate::selection::{CatalogSources, DEFAULT_RELEASED_CATALOG, DEFAULT_SHARD_CATALOGS};
use crate::storage::{JsonFileBackend, Storage};
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "REVGUESS_CONFIG";

/// Directory name used under platform config/data/temp dirs
pub const APP_DIR: &str = "revguess";

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state.json";
const SESSION_FILE_NAME: &str = "session.json";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Directory that catalog source ids are resolved against
    #[serde(default)]
    pub catalog_root: Option<PathBuf>,

    /// Base URL for HTTP catalogs; takes precedence over `catalog_root`
    #[serde(default)]
    pub catalog_base_url: Option<String>,

    /// Released catalog source id
    #[serde(default = "default_released_catalog")]
    pub released_catalog: String,

    /// Balanced-mode shard source ids
    #[serde(default = "default_shard_catalogs")]
    pub shard_catalogs: Vec<String>,

    /// Target used when no catalog yields a record
    #[serde(default = "default_target_id")]
    pub default_target_id: u64,

    /// Store page URL, `{id}` is replaced with the target id
    #[serde(default = "default_store_url_template")]
    pub store_url_template: String,

    /// Directory holding long-lived state
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// File holding session-scoped state
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            catalog_root: None,
            catalog_base_url: None,
            released_catalog: default_released_catalog(),
            shard_catalogs: default_shard_catalogs(),
            default_target_id: default_target_id(),
            store_url_template: default_store_url_template(),
            state_dir: None,
            session_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_released_catalog() -> String {
    DEFAULT_RELEASED_CATALOG.to_string()
}

fn default_shard_catalogs() -> Vec<String> {
    DEFAULT_SHARD_CATALOGS.iter().map(|s| s.to_string()).collect()
}

fn default_target_id() -> u64 {
    570
}

fn default_store_url_template() -> String {
    "https://store.steampowered.com/app/{id}/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform-dependent fallback paths
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub catalog_root: PathBuf,
    pub state_dir: PathBuf,
    pub session_file: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));

        Self {
            catalog_root: data_dir.clone(),
            state_dir: data_dir,
            session_file: std::env::temp_dir().join(APP_DIR).join(SESSION_FILE_NAME),
            log_level: default_log_level(),
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfig(PathBuf),
    CompiledDefaults,
}

/// Locates and loads the TOML configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Config file to use, by priority
    pub fn locate(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        match user_config_path() {
            Some(path) => ConfigSource::UserConfig(path),
            None => ConfigSource::CompiledDefaults,
        }
    }

    /// Load the effective configuration
    ///
    /// # Errors
    ///
    /// Fails only when an explicitly named file cannot be read or parsed.
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.locate();
        let config = match &source {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                load_toml_config(path)?
            }
            ConfigSource::UserConfig(path) => {
                if path.exists() {
                    load_toml_config(path)?
                } else {
                    warn!(
                        "No config file at {}, using compiled defaults",
                        path.display()
                    );
                    TomlConfig::default()
                }
            }
            ConfigSource::CompiledDefaults => {
                warn!("Could not determine config directory, using compiled defaults");
                TomlConfig::default()
            }
        };
        Ok((config, source))
    }
}

/// `<config_dir>/revguess/config.toml`, when the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Read and parse one TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

impl TomlConfig {
    /// Catalog sources for the selection policy
    pub fn catalog_sources(&self) -> CatalogSources {
        CatalogSources {
            released: self.released_catalog.clone(),
            shards: self.shard_catalogs.clone(),
        }
    }

    pub fn resolved_catalog_root(&self) -> PathBuf {
        self.catalog_root
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().catalog_root)
    }

    pub fn resolved_state_path(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().state_dir)
            .join(STATE_FILE_NAME)
    }

    pub fn resolved_session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().session_file)
    }

    /// HTTP fetcher when a base URL is configured, file fetcher otherwise
    pub fn build_fetcher(&self) -> Result<Arc<dyn CatalogFetcher>> {
        let fetcher: Arc<dyn CatalogFetcher> = match &self.catalog_base_url {
            Some(url) => {
                info!("Catalogs served from {}", url);
                Arc::new(HttpFetcher::new(url)?)
            }
            None => {
                let root = self.resolved_catalog_root();
                info!("Catalogs read from {}", root.display());
                Arc::new(FileFetcher::new(root))
            }
        };
        Ok(fetcher)
    }

    /// Long-lived storage (lifetime stats, preferences)
    pub fn long_lived_storage(&self) -> Storage {
        Storage::new(JsonFileBackend::new(self.resolved_state_path()))
    }

    /// Session-scoped storage (current streak)
    pub fn session_storage(&self) -> Storage {
        Storage::new(JsonFileBackend::new(self.resolved_session_path()))
    }
}
