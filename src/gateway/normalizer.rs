//! Response normalization: every adapter outcome becomes one envelope.

use http::StatusCode;
use serde::Serialize;
use serde_json::value::RawValue;
use tracing::debug;

use crate::error::{ErrorCode, GatewayError};
use crate::gateway::adapters::ProviderPayload;
use crate::gateway::routes::StatusPolicy;

/// JSON body returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnvelopeBody {
    Success {
        body: Box<RawValue>,
    },
    Error {
        code: ErrorCode,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_response: Option<String>,
    },
}

/// Uniform outward result: the HTTP status the gateway answers with, plus the
/// envelope body.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: StatusCode,
    pub body: EnvelopeBody,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self.body, EnvelopeBody::Success { .. })
    }

    /// Serialized envelope body.
    pub fn to_json(&self) -> String {
        // Serializing owned strings, an error code and pre-validated raw JSON cannot fail
        serde_json::to_string(&self.body).unwrap_or_default()
    }

    /// Provider body of a successful envelope.
    pub fn success_body(&self) -> Option<&str> {
        match &self.body {
            EnvelopeBody::Success { body } => Some(body.get()),
            EnvelopeBody::Error { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match &self.body {
            EnvelopeBody::Error { code, .. } => Some(*code),
            EnvelopeBody::Success { .. } => None,
        }
    }
}

/// Converts an adapter outcome into an envelope. Never fails.
///
/// # Arguments
/// * `outcome` - Provider payload or typed gateway error
/// * `policy` - Whether provider 4xx/5xx statuses are forwarded or flattened to 500
///
/// # Returns
/// * `Envelope` - Success mirrors the provider's 2xx status; errors map
///   `MissingParameter`/`InvalidParameter`→400, `NotFound`→404, transport and parse failures→500,
///   `ProviderError`→provider status or 500 depending on `policy`
pub fn normalize(outcome: Result<ProviderPayload, GatewayError>, policy: StatusPolicy) -> Envelope {
    match outcome {
        Ok(payload) => Envelope {
            status: StatusCode::from_u16(payload.status)
                .ok()
                .filter(StatusCode::is_success)
                .unwrap_or(StatusCode::OK),
            body: EnvelopeBody::Success { body: payload.body },
        },
        Err(error) => {
            let status = error_status(&error, policy);
            debug!("Normalizing {} as HTTP {}", error.code().as_str(), status);
            Envelope {
                status,
                body: EnvelopeBody::Error {
                    code: error.code(),
                    error: error.to_string(),
                    raw_response: error.raw_response().map(str::to_string),
                },
            }
        }
    }
}

fn error_status(error: &GatewayError, policy: StatusPolicy) -> StatusCode {
    match error {
        GatewayError::MissingParameter { .. } | GatewayError::InvalidParameter { .. } => {
            StatusCode::BAD_REQUEST
        }
        GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
        GatewayError::ProviderUnreachable { .. } | GatewayError::MalformedProviderResponse { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        GatewayError::ProviderError { status, .. } => match policy {
            StatusPolicy::AlwaysInternal => StatusCode::INTERNAL_SERVER_ERROR,
            StatusPolicy::ForwardProvider => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        },
    }
}
