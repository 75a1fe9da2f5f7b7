use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::directory::Node;

use crate::service_config::{Config as ServiceConfig, StoreBackend};

pub const APP_NAME: &str = "awm";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const TOOLS_DIR_NAME: &str = "tools";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the HTTP server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Externally visible base URL of this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<Url>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Upper bound on a single remote node call
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_node_id: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Federation peers, queried in this order
    #[serde(default)]
    pub nodes: Vec<Node>,
}

fn default_api_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            public_url: None,
            log_level: default_log_level(),
            log_dir: None,
            remote_timeout_secs: default_remote_timeout_secs(),
            self_node_id: None,
            store: StoreConfig::default(),
            catalog: CatalogConfig::default(),
            auth: AuthConfig::default(),
            nodes: Vec::new(),
        }
    }
}

/// Record store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// SQLite database (defaults to awm_dir/db.sqlite)
    Sqlite {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Volatile in-memory store
    #[default]
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Blueprint directory (defaults to awm_dir/tools)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the awm directory (~/.awm)
    pub awm_dir: PathBuf,
    /// Path to the default SQLite database
    pub db_path: PathBuf,
    /// Path to the default blueprint directory
    pub tools_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the awm directory path (custom or default ~/.awm)
    pub fn awm_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new awm state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let awm_dir = Self::awm_dir(custom_path)?;

        if awm_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&awm_dir)?;

        let tools_path = awm_dir.join(TOOLS_DIR_NAME);
        fs::create_dir_all(&tools_path)?;

        // New nodes persist records unless told otherwise
        let config = config.unwrap_or_else(|| AppConfig {
            store: StoreConfig::Sqlite { path: None },
            ..AppConfig::default()
        });
        let config_path = awm_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            db_path: awm_dir.join(DB_FILE_NAME),
            awm_dir,
            tools_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the awm directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let awm_dir = Self::awm_dir(custom_path)?;

        if !awm_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = awm_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            db_path: awm_dir.join(DB_FILE_NAME),
            tools_path: awm_dir.join(TOOLS_DIR_NAME),
            awm_dir,
            config_path,
            config,
        })
    }

    /// Resolve the file config into the runtime service config.
    pub fn service_config(&self) -> Result<ServiceConfig, StateError> {
        let log_level = tracing::Level::from_str(&self.config.log_level)
            .map_err(|_| StateError::InvalidConfig(format!("log_level '{}'", self.config.log_level)))?;

        let store = match &self.config.store {
            StoreConfig::Sqlite { path } => {
                StoreBackend::Sqlite(path.clone().unwrap_or_else(|| self.db_path.clone()))
            }
            StoreConfig::Memory => StoreBackend::Memory,
        };

        Ok(ServiceConfig {
            api_port: self.config.api_port,
            public_url: self.config.public_url.clone(),
            store,
            catalog_path: self
                .config
                .catalog
                .path
                .clone()
                .unwrap_or_else(|| self.tools_path.clone()),
            userinfo_url: self.config.auth.userinfo_url.clone(),
            nodes: self.config.nodes.clone(),
            self_node_id: self.config.self_node_id.clone(),
            remote_timeout: Duration::from_secs(self.config.remote_timeout_secs),
            log_level,
            log_dir: self.config.log_dir.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("awm directory not initialized. Run 'awm init' first")]
    NotInitialized,

    #[error("awm directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
