use crate::constants::{env_vars, server};
use crate::error::AppError;
use crate::gateway::ProviderId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Per-provider settings under `[providers.<id>]`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProviderOverride {
    /// Replaces the provider's built-in base URL, e.g. to point at a mock server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Configuration structure for the gateway.
/// Handles loading, saving, and managing server settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Port the HTTP listener binds to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// HTTP timeout in seconds for provider requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// Provider overrides keyed by provider id (`balldontlie`, `api_football`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ProviderOverride>,
}

fn default_bind_address() -> String {
    server::DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    server::DEFAULT_PORT
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: default_bind_address(),
            port: default_port(),
            http_timeout_seconds: default_http_timeout(),
            log_file_path: None,
            providers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default config file location.
    /// A missing file yields the defaults. Environment variables override file values.
    ///
    /// # Environment Variables
    /// - `SPORTS_GATEWAY_BIND` - Override bind address
    /// - `SPORTS_GATEWAY_PORT` - Override port
    /// - `SPORTS_GATEWAY_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `SPORTS_GATEWAY_LOG_FILE` - Override log file path
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(AppError)` - Unreadable file, invalid TOML or failed validation
    pub async fn load(path: Option<&str>) -> Result<Self, AppError> {
        let config_path = path.map_or_else(get_config_path, str::to_string);

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            if path.is_some() {
                return Err(AppError::config_error(format!(
                    "Config file '{config_path}' does not exist"
                )));
            }
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind_address) = std::env::var(env_vars::BIND_ADDRESS) {
            self.bind_address = bind_address;
        }

        if let Ok(port) = std::env::var(env_vars::PORT) {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring {}='{}': not a port number", env_vars::PORT, port),
            }
        }

        if let Ok(timeout) = std::env::var(env_vars::HTTP_TIMEOUT) {
            match timeout.parse::<u64>() {
                Ok(timeout) => self.http_timeout_seconds = timeout,
                Err(_) => warn!(
                    "Ignoring {}='{}': not a number of seconds",
                    env_vars::HTTP_TIMEOUT,
                    timeout
                ),
            }
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }
    }

    /// Validates the configuration settings
    ///
    /// # Returns
    /// * `Ok(())` - Configuration is valid
    /// * `Err(AppError)` - Configuration validation failed
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Address string for the HTTP listener, e.g. `0.0.0.0:8081`.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Base URL override for a provider, if configured.
    pub fn provider_base_url(&self, id: ProviderId) -> Option<&str> {
        self.providers
            .get(id.as_str())
            .and_then(|p| p.base_url.as_deref())
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays the effective configuration settings to stdout.
    ///
    /// # Returns
    /// * `Ok(())` - Successfully displayed configuration
    /// * `Err(AppError)` - Error occurred while reading config
    ///
    /// # Notes
    /// - Shows config file location, listener, timeout, log location and provider base URLs
    /// - Reports when no config file exists and defaults are in effect
    pub async fn display(path: Option<&str>) -> Result<(), AppError> {
        let config_path = path.map_or_else(get_config_path, str::to_string);
        let log_dir = get_log_dir_path();
        let config = Config::load(path).await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        println!("{config_path}");
        if !Path::new(&config_path).exists() {
            println!("(Not found, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("Listen Address:");
        println!("{}", config.listen_address());
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/sports_gateway.log");
            println!("(Default location)");
        }
        println!("────────────────────────────────────");
        println!("Providers:");
        for id in ProviderId::ALL {
            match config.provider_base_url(id) {
                Some(base_url) => println!("{id}: {base_url} (override)"),
                None => println!("{id}: {}", id.default_base_url()),
            }
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Arguments
    /// * `path` - The file path where the configuration should be saved
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path, without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
