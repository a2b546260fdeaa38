//! Single-call adapter: one validated request, one provider call.

use tracing::{info, instrument};

use crate::error::GatewayError;
use crate::gateway::adapters::classify::{ProviderPayload, classify, matches_in};
use crate::gateway::models::ResolvedParams;
use crate::gateway::providers::ProviderDescriptor;
use crate::gateway::routes::Endpoint;
use crate::gateway::transport::{OutboundCall, Transport};

/// Issues one provider call for an already validated request.
///
/// # Arguments
/// * `transport` - Network capability used to send the call
/// * `provider` - Descriptor supplying base URL and credential
/// * `endpoint` - Path/query templates and optional match-list expectation
/// * `params` - Validated parameters, defaults included
///
/// # Returns
/// * `Ok(ProviderPayload)` - 2xx JSON body, untouched
/// * `Err(GatewayError)` - Unreachable, provider error, malformed body, or
///   `NotFound` when the endpoint expects matches and there are none
#[instrument(skip_all, fields(provider = %provider.id, endpoint = endpoint.label))]
pub async fn execute_single(
    transport: &dyn Transport,
    provider: &ProviderDescriptor,
    endpoint: &Endpoint,
    params: &ResolvedParams,
) -> Result<ProviderPayload, GatewayError> {
    let call = build_call(provider, endpoint, |name| params.lookup(name));
    fetch(transport, &call, endpoint).await
}

/// Builds the outbound call for an endpoint.
///
/// Route templates are verified at startup, so a failure here is a defect in
/// the route table rather than an operating condition.
pub(crate) fn build_call<'a>(
    provider: &ProviderDescriptor,
    endpoint: &Endpoint,
    lookup: impl Fn(&str) -> Option<&'a str> + Copy,
) -> OutboundCall {
    OutboundCall::build(provider, endpoint.path, endpoint.query, lookup).unwrap_or_else(|e| {
        panic!(
            "route template defect in {} {} endpoint: {e}",
            provider.id, endpoint.label
        )
    })
}

/// Sends a built call and applies the classification rules, including the
/// endpoint's match-list expectation.
pub(crate) async fn fetch(
    transport: &dyn Transport,
    call: &OutboundCall,
    endpoint: &Endpoint,
) -> Result<ProviderPayload, GatewayError> {
    info!(
        "Fetching {} from {}: {}",
        endpoint.label,
        call.provider,
        call.redacted_url()
    );
    let outcome = transport.send(call).await;
    let payload = classify(call, endpoint.label, outcome)?;

    if let Some(list) = &endpoint.matches {
        let value = payload.value()?;
        if matches_in(&value, list, call.provider, endpoint.label)?.is_empty() {
            info!("{} {} returned no matches", call.provider, endpoint.label);
            return Err(GatewayError::not_found(list.not_found));
        }
    }

    Ok(payload)
}
