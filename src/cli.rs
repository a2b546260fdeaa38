use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

use crate::config::Config;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Sports data gateway
///
/// Serves a small, uniform HTTP API over several third-party sports data
/// providers (balldontlie, API-Football, football-data.org, PandaScore and
/// The Odds API). Provider credentials are read from environment variables
/// at startup.
#[derive(Parser, Debug, Default)]
#[command(about, version, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Read configuration from this TOML file instead of the default location.
    #[arg(long = "config", value_name = "PATH", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Address to bind the HTTP listener to. Overrides config and environment.
    #[arg(long = "bind", value_name = "ADDR", help_heading = "Server")]
    pub bind: Option<String>,

    /// Port to listen on. Overrides config and environment.
    #[arg(short, long, help_heading = "Server")]
    pub port: Option<u16>,

    /// List current configuration settings and exit
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Log at debug level for the gateway's own modules.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

impl Args {
    /// Applies command line values on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file_path = Some(log_file.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_flags() {
        let args = Args::try_parse_from([
            "sports_gateway",
            "--bind",
            "127.0.0.1",
            "-p",
            "9000",
            "--debug",
        ])
        .unwrap();

        assert_eq!(args.bind.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(9000));
        assert!(args.debug);
        assert!(!args.list_config);
    }

    #[test]
    fn test_rejects_out_of_range_port() {
        assert!(Args::try_parse_from(["sports_gateway", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_cli_values_override_config() {
        let args = Args::try_parse_from([
            "sports_gateway",
            "--port",
            "9000",
            "--log-file",
            "/tmp/gw.log",
        ])
        .unwrap();
        let mut config = Config {
            bind_address: "10.0.0.1".to_string(),
            ..Config::default()
        };

        args.apply_overrides(&mut config);

        assert_eq!(config.bind_address, "10.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_file_path.as_deref(), Some("/tmp/gw.log"));
    }
}
