use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use std::io::stdout;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_NAME: &str = "sports_gateway.log";

/// Splits the configured log file path into directory and file name,
/// falling back to the default log directory.
pub fn log_location(config: &Config) -> (String, String) {
    match &config.log_file_path {
        Some(custom_path) => {
            let path = Path::new(custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (Config::get_log_dir_path(), LOG_FILE_NAME.to_string()),
    }
}

fn env_filter(debug: bool) -> Result<EnvFilter, AppError> {
    let directive = if debug {
        "sports_gateway=debug"
    } else {
        "sports_gateway=info"
    };
    let directive = directive
        .parse::<Directive>()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Sets up logging for the gateway.
///
/// Logs go to stdout and to a daily rolling file. The file location comes from
/// the effective configuration (`--log-file`, `SPORTS_GATEWAY_LOG_FILE` or the
/// config file), defaulting to the platform log directory.
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(args: &Args, config: &Config) -> Result<(String, WorkerGuard), AppError> {
    let (log_dir, log_file_name) = log_location(config);

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(stdout)
                .with_ansi(true)
                .with_filter(env_filter(args.debug)?),
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter(args.debug)?),
        )
        .try_init()
        .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_location_defaults_to_log_dir() {
        let (dir, file) = log_location(&Config::default());
        assert!(dir.ends_with("logs"));
        assert_eq!(file, "sports_gateway.log");
    }

    #[test]
    fn test_log_location_splits_custom_path() {
        let config = Config {
            log_file_path: Some("/var/log/gw/gateway.log".to_string()),
            ..Config::default()
        };
        assert_eq!(
            log_location(&config),
            ("/var/log/gw".to_string(), "gateway.log".to_string())
        );
    }

    #[test]
    fn test_log_location_bare_file_name_uses_current_dir() {
        let config = Config {
            log_file_path: Some("gateway.log".to_string()),
            ..Config::default()
        };
        assert_eq!(
            log_location(&config),
            (".".to_string(), "gateway.log".to_string())
        );
    }

    #[test]
    fn test_env_filter_accepts_both_levels() {
        assert!(env_filter(false).is_ok());
        assert!(env_filter(true).is_ok());
    }
}
