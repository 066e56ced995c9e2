//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are merged by the binary's argument parser and arrive here
//! as a single [`ConfigLayer`]. Database credentials have no default; a
//! configuration without them is rejected at startup.

use crate::messages::Locale;
use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "antistress";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MODEL_PATH: &str = "prediction.model";
/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "antistress.toml";

/// A partial configuration: one tier of the resolution order
///
/// Also the schema of the TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_name: Option<String>,
    pub db_max_connections: Option<u32>,
    pub model_path: Option<PathBuf>,
    pub locale: Option<Locale>,
}

impl ConfigLayer {
    /// Fill every setting missing here from `lower`
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            db_username: self.db_username.or(lower.db_username),
            db_password: self.db_password.or(lower.db_password),
            db_host: self.db_host.or(lower.db_host),
            db_port: self.db_port.or(lower.db_port),
            db_name: self.db_name.or(lower.db_name),
            db_max_connections: self.db_max_connections.or(lower.db_max_connections),
            model_path: self.model_path.or(lower.model_path),
            locale: self.locale.or(lower.locale),
        }
    }
}

/// Connection settings for the PostgreSQL store
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
}

// Password never reaches logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub model_path: PathBuf,
    pub locale: Locale,
}

impl ServiceConfig {
    /// Resolve `overrides` (command line and environment) over the config file
    ///
    /// `config_file` names an explicit file, which must exist. Without one,
    /// [`DEFAULT_CONFIG_FILE`] is read from the working directory if present.
    pub fn resolve(overrides: ConfigLayer, config_file: Option<&Path>) -> Result<Self> {
        let file_layer = match locate_config_file(config_file)? {
            Some(path) => {
                info!("Loading configuration file: {}", path.display());
                load_config_file(&path)?
            }
            None => {
                debug!("No configuration file found, using arguments and environment only");
                ConfigLayer::default()
            }
        };

        Self::from_layer(overrides.or(file_layer))
    }

    /// Apply compiled defaults and check required settings
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let username = required(layer.db_username, "database username", "DB_USERNAME", "db_username")?;
        let password = required(layer.db_password, "database password", "DB_PASSWORD", "db_password")?;

        let max_connections = layer.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(Error::Config(
                "db_max_connections must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: layer.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: layer.port.unwrap_or(DEFAULT_PORT),
            database: DatabaseConfig {
                username,
                password,
                host: layer.db_host.unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: layer.db_port.unwrap_or(DEFAULT_DB_PORT),
                name: layer.db_name.unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                max_connections,
            },
            model_path: layer
                .model_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            locale: layer.locale.unwrap_or_default(),
        })
    }

    /// `host:port` to bind the HTTP listener to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(value: Option<String>, what: &str, env_var: &str, toml_key: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Config(format!(
            "{} not configured. Set one of:\n\
             1. Environment: {}=...\n\
             2. TOML config: {} ({} = \"...\")",
            what, env_var, DEFAULT_CONFIG_FILE, toml_key
        ))),
    }
}

fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    Ok(default.exists().then_some(default))
}

/// Read one TOML config file
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}
