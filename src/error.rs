use serde::Serialize;
use thiserror::Error;

use crate::gateway::models::Param;

/// Process-level failures. These stop the gateway during startup and never
/// reach a client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }
}

/// Stable identifiers for request failures, as written to the `code` field of
/// an error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingParameter,
    InvalidParameter,
    NotFound,
    ProviderUnreachable,
    ProviderError,
    MalformedProviderResponse,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingParameter => "missing_parameter",
            ErrorCode::InvalidParameter => "invalid_parameter",
            ErrorCode::NotFound => "not_found",
            ErrorCode::ProviderUnreachable => "provider_unreachable",
            ErrorCode::ProviderError => "provider_error",
            ErrorCode::MalformedProviderResponse => "malformed_provider_response",
        }
    }
}

/// Outcome of a logical request that did not succeed.
///
/// Every variant is recovered at the adapter boundary and turned into an
/// error envelope by the normalizer; none of them escape to the HTTP layer
/// as a fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Missing required parameters: {}. Usage: {usage}", join_params(.missing))]
    MissingParameter {
        operation: String,
        missing: Vec<Param>,
        usage: String,
    },

    #[error("Invalid value '{value}' for {param}. Usage: {usage}")]
    InvalidParameter {
        param: Param,
        value: String,
        usage: String,
    },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Could not reach {provider}: {message}")]
    ProviderUnreachable { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    ProviderError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{message}")]
    MalformedProviderResponse {
        provider: String,
        message: String,
        raw_response: Option<String>,
    },
}

fn join_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl GatewayError {
    /// Create a missing parameter error listing every absent parameter
    pub fn missing_parameter(
        operation: impl Into<String>,
        missing: Vec<Param>,
        usage: impl Into<String>,
    ) -> Self {
        Self::MissingParameter {
            operation: operation.into(),
            missing,
            usage: usage.into(),
        }
    }

    /// Create an error for a supplied value that cannot be used as given
    pub fn invalid_parameter(
        param: Param,
        value: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            param,
            value: value.into(),
            usage: usage.into(),
        }
    }

    /// Create a domain not-found error (valid request, no matching entity)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a transport failure error
    pub fn provider_unreachable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnreachable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a non-2xx provider error
    pub fn provider_error(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error, optionally carrying a truncated raw body
    pub fn malformed_response(
        provider: impl Into<String>,
        message: impl Into<String>,
        raw_response: Option<String>,
    ) -> Self {
        Self::MalformedProviderResponse {
            provider: provider.into(),
            message: message.into(),
            raw_response,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::MissingParameter { .. } => ErrorCode::MissingParameter,
            GatewayError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            GatewayError::NotFound { .. } => ErrorCode::NotFound,
            GatewayError::ProviderUnreachable { .. } => ErrorCode::ProviderUnreachable,
            GatewayError::ProviderError { .. } => ErrorCode::ProviderError,
            GatewayError::MalformedProviderResponse { .. } => {
                ErrorCode::MalformedProviderResponse
            }
        }
    }

    /// Check if error indicates data not found (business logic, not technical error)
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    /// Check if the failure originated at or beyond the provider boundary
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::ProviderUnreachable { .. }
                | GatewayError::ProviderError { .. }
                | GatewayError::MalformedProviderResponse { .. }
        )
    }

    /// Truncated provider body, present only for malformed responses
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            GatewayError::MalformedProviderResponse { raw_response, .. } => raw_response.as_deref(),
            _ => None,
        }
    }
}
