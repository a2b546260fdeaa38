//! Outcome classification shared by both adapters.

use serde_json::Value;
use serde_json::value::RawValue;
use tracing::{debug, error, warn};

use crate::constants::response::RAW_RESPONSE_PREVIEW_CHARS;
use crate::error::GatewayError;
use crate::gateway::providers::ProviderId;
use crate::gateway::routes::MatchList;
use crate::gateway::transport::{OutboundCall, TransportError, TransportResponse};

/// A 2xx provider reply whose body is known to be JSON. The body is kept as
/// the provider sent it so that it can be passed through without
/// re-serialization.
#[derive(Debug, Clone)]
pub struct ProviderPayload {
    pub provider: ProviderId,
    pub status: u16,
    pub body: Box<RawValue>,
}

impl ProviderPayload {
    /// Parses the body into a `Value` for inspection.
    pub fn value(&self) -> Result<Value, GatewayError> {
        serde_json::from_str(self.body.get()).map_err(|e| {
            GatewayError::malformed_response(
                self.provider.as_str(),
                format!("Error parsing JSON from {}: {e}", self.provider),
                Some(preview(self.body.get())),
            )
        })
    }
}

/// First [`RAW_RESPONSE_PREVIEW_CHARS`] characters of a body.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(RAW_RESPONSE_PREVIEW_CHARS).collect()
}

/// Maps one transport outcome to a payload or a typed gateway error.
///
/// - transport failure → `ProviderUnreachable`
/// - non-2xx → `ProviderError` with the provider's status
/// - 2xx with a non-JSON body → `MalformedProviderResponse` with a body preview
pub(crate) fn classify(
    call: &OutboundCall,
    label: &str,
    outcome: Result<TransportResponse, TransportError>,
) -> Result<ProviderPayload, GatewayError> {
    let provider = call.provider;
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!(
                "{} {} call failed: {} (URL: {})",
                provider,
                label,
                e,
                call.redacted_url()
            );
            return Err(GatewayError::provider_unreachable(
                provider.as_str(),
                e.to_string(),
            ));
        }
    };

    if !(200..300).contains(&response.status) {
        let reason = http::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error");
        error!(
            "HTTP {} - {} from {} {} (URL: {})",
            response.status,
            reason,
            provider,
            label,
            call.redacted_url()
        );
        return Err(GatewayError::provider_error(
            provider.as_str(),
            response.status,
            reason,
        ));
    }

    match RawValue::from_string(response.body.clone()) {
        Ok(body) => {
            debug!("{} {} returned {} bytes of JSON", provider, label, body.get().len());
            Ok(ProviderPayload {
                provider,
                status: response.status,
                body,
            })
        }
        Err(e) => {
            warn!(
                "Failed to parse {} {} response: {} (first 200 chars: {})",
                provider,
                label,
                e,
                response.body.chars().take(200).collect::<String>()
            );
            Err(GatewayError::malformed_response(
                provider.as_str(),
                format!("Error parsing JSON from {provider} {label}"),
                Some(preview(&response.body)),
            ))
        }
    }
}

/// Locates the match list in a parsed body.
///
/// A missing or `null` list reads as empty. Anything other than an array is
/// a structural defect of the provider response.
pub(crate) fn matches_in<'v>(
    value: &'v Value,
    list: &MatchList,
    provider: ProviderId,
    label: &str,
) -> Result<&'v [Value], GatewayError> {
    match value.pointer(list.pointer) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(GatewayError::malformed_response(
            provider.as_str(),
            format!(
                "Unexpected {provider} {label} response: expected a list at '{}'",
                list.pointer
            ),
            Some(preview(&other.to_string())),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::providers::ProviderDescriptor;
    use reqwest::Url;
    use serde_json::json;

    fn call() -> OutboundCall {
        let provider = ProviderDescriptor::new(
            ProviderId::Balldontlie,
            Url::parse("https://example.com/api/v1").unwrap(),
            None,
        );
        OutboundCall::build(&provider, "/players", &[], |_| None).unwrap()
    }

    const DATA_LIST: MatchList = MatchList {
        pointer: "/data",
        not_found: "Player not found",
    };

    #[test]
    fn test_transport_failure_is_unreachable() {
        let result = classify(
            &call(),
            "search",
            Err(TransportError::Connect("connection refused".to_string())),
        );

        let err = result.unwrap_err();
        assert_eq!(
            err,
            GatewayError::provider_unreachable(
                "balldontlie",
                "connection failed: connection refused"
            )
        );
    }

    #[test]
    fn test_timeout_is_unreachable() {
        let err = classify(&call(), "search", Err(TransportError::Timeout)).unwrap_err();
        assert!(matches!(err, GatewayError::ProviderUnreachable { ref message, .. } if message == "request timed out"));
    }

    #[test]
    fn test_non_success_status_is_provider_error() {
        let err = classify(&call(), "search", Ok(TransportResponse::new(429, "{}"))).unwrap_err();
        assert_eq!(
            err,
            GatewayError::provider_error("balldontlie", 429, "Too Many Requests")
        );
    }

    #[test]
    fn test_unknown_status_uses_fallback_reason() {
        let err = classify(&call(), "search", Ok(TransportResponse::new(599, ""))).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ProviderError { status: 599, ref message, .. } if message == "Unknown error"
        ));
    }

    #[test]
    fn test_non_json_body_is_malformed_with_preview() {
        let body = "<html>".repeat(200);
        let err = classify(&call(), "search", Ok(TransportResponse::new(200, body.clone())))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error parsing JSON from balldontlie search"
        );
        let raw = err.raw_response().unwrap();
        assert_eq!(raw.chars().count(), RAW_RESPONSE_PREVIEW_CHARS);
        assert!(body.starts_with(raw));
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let err = classify(&call(), "search", Ok(TransportResponse::new(200, ""))).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedProviderResponse { .. }));
    }

    #[test]
    fn test_json_body_passes_through_verbatim() {
        let body = r#"{"data":[{"id":237,"first_name":"LeBron"}],"meta":{"total_count":1}}"#;
        let payload = classify(&call(), "search", Ok(TransportResponse::new(200, body))).unwrap();

        assert_eq!(payload.status, 200);
        assert_eq!(payload.body.get(), body);
        assert_eq!(payload.value().unwrap()["data"][0]["id"], json!(237));
    }

    #[test]
    fn test_matches_in_reads_missing_and_null_as_empty() {
        let missing = json!({"meta": {}});
        let null = json!({"data": null});
        assert!(matches_in(&missing, &DATA_LIST, ProviderId::Balldontlie, "search").unwrap().is_empty());
        assert!(matches_in(&null, &DATA_LIST, ProviderId::Balldontlie, "search").unwrap().is_empty());
    }

    #[test]
    fn test_matches_in_rejects_non_array() {
        let value = json!({"data": {"id": 1}});
        let err = matches_in(&value, &DATA_LIST, ProviderId::Balldontlie, "search").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedProviderResponse { .. }));
    }

    #[test]
    fn test_matches_in_root_pointer() {
        let root = MatchList {
            pointer: "",
            not_found: "Player not found",
        };
        let value = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(
            matches_in(&value, &root, ProviderId::PandaScore, "player search").unwrap().len(),
            2
        );
    }
}
