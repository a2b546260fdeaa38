//! Sports Data Gateway Library
//!
//! One HTTP surface in front of several third-party sports data providers.
//! Each logical operation is validated against a declarative route table,
//! sent to its provider (a single call, or a search-then-fetch lookup) and
//! normalized into a uniform JSON envelope.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sports_gateway::config::Config;
//! use sports_gateway::error::AppError;
//! use sports_gateway::gateway::{
//!     Credentials, Gateway, LogicalRequest, Operation, Param, ProviderTable, ReqwestTransport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load(None).await?;
//!     let providers = ProviderTable::from_config(&config, &Credentials::from_env()?)?;
//!     let transport = ReqwestTransport::new(config.http_timeout_seconds)?;
//!     let gateway = Gateway::new(providers, Arc::new(transport))?;
//!
//!     let request = LogicalRequest::new(Operation::NbaPlayerStats)
//!         .with_param(Param::Player, "lebron james")
//!         .with_param(Param::Season, "2022");
//!     let envelope = gateway.dispatch(&request).await;
//!     println!("{} {}", envelope.status, envelope.to_json());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod server;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AppError, GatewayError};
pub use gateway::{Envelope, Gateway, LogicalRequest, Operation, Param};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
