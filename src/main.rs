// src/main.rs
use std::sync::Arc;

use clap::Parser;
use sports_gateway::cli::Args;
use sports_gateway::config::Config;
use sports_gateway::error::AppError;
use sports_gateway::gateway::{Credentials, Gateway, ProviderTable, ReqwestTransport};
use sports_gateway::logging::setup_logging;
use sports_gateway::server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.list_config {
        return Config::display(args.config.as_deref()).await;
    }

    let mut config = Config::load(args.config.as_deref()).await?;
    args.apply_overrides(&mut config);
    config.validate()?;

    // The guard must be kept alive for the duration of the program
    // to ensure logs are flushed properly
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    info!(
        "Starting {} {} (logs: {})",
        sports_gateway::NAME,
        sports_gateway::VERSION,
        log_file_path
    );

    let credentials = Credentials::from_env()?;
    let providers = ProviderTable::from_config(&config, &credentials)?;
    let transport = ReqwestTransport::new(config.http_timeout_seconds)?;
    let gateway = Gateway::new(providers, Arc::new(transport))?;

    server::serve(Arc::new(gateway), &config.listen_address()).await
}
