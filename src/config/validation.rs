use crate::config::Config;
use crate::error::AppError;
use reqwest::Url;
use std::path::Path;

/// Validates the configuration settings
///
/// # Arguments
/// * `config` - The configuration to validate
///
/// # Returns
/// * `Ok(())` - Configuration is valid
/// * `Err(AppError)` - Configuration validation failed
///
/// # Validation Rules
/// - Bind address cannot be empty
/// - Port and HTTP timeout must be non-zero
/// - Provider overrides must name a known provider and carry an http(s) base URL
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.bind_address.trim().is_empty() {
        return Err(AppError::config_error("Bind address cannot be empty"));
    }

    if config.port == 0 {
        return Err(AppError::config_error("Port must be between 1 and 65535"));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "HTTP timeout must be at least 1 second",
        ));
    }

    for (name, provider) in &config.providers {
        if name.parse::<crate::gateway::ProviderId>().is_err() {
            return Err(AppError::config_error(format!(
                "Unknown provider '{name}' in [providers]"
            )));
        }
        if let Some(base_url) = &provider.base_url {
            validate_base_url(name, base_url)?;
        }
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

fn validate_base_url(provider: &str, base_url: &str) -> Result<(), AppError> {
    let url = Url::parse(base_url).map_err(|e| {
        AppError::config_error(format!(
            "Base URL '{base_url}' for provider '{provider}' is not a valid URL: {e}"
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config_error(format!(
            "Base URL for provider '{provider}' must use http or https"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderOverride;
    use tempfile::tempdir;

    fn with_override(name: &str, base_url: &str) -> Config {
        let mut config = Config::default();
        config.providers.insert(
            name.to_string(),
            ProviderOverride {
                base_url: Some(base_url.to_string()),
            },
        );
        config
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_empty_bind_and_zero_values() {
        let mut config = Config::default();
        config.bind_address = "  ".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.http_timeout_seconds = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_provider_overrides() {
        assert!(validate_config(&with_override("pandascore", "not a url")).is_err());
        assert!(validate_config(&with_override("pandascore", "ftp://example.com")).is_err());
        assert!(validate_config(&with_override("espn", "https://example.com")).is_err());
        assert!(validate_config(&with_override("pandascore", "http://localhost:9000")).is_ok());
    }

    #[test]
    fn test_log_path_parent_is_created() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("gateway.log");
        let mut config = Config::default();
        config.log_file_path = Some(log_path.to_string_lossy().to_string());

        validate_config(&config).unwrap();

        assert!(temp_dir.path().join("nested").exists());
    }

    #[test]
    fn test_rejects_empty_log_path() {
        let mut config = Config::default();
        config.log_file_path = Some(String::new());
        assert!(validate_config(&config).is_err());
    }
}
