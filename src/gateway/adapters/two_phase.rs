//! Search-then-fetch lookups.
//!
//! The lookup runs as a small state machine, `Searching → Resolving → Done`.
//! The resolve call is only ever built from an identifier the search phase
//! produced, and the first failure in either phase ends the lookup.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::GatewayError;
use crate::gateway::adapters::classify::{ProviderPayload, matches_in, preview};
use crate::gateway::adapters::single_call::{build_call, fetch};
use crate::gateway::models::{LookupResult, ResolvedParams};
use crate::gateway::providers::{ProviderDescriptor, ProviderId};
use crate::gateway::routes::{LOOKUP_ID_PLACEHOLDER, TwoPhaseLookup};
use crate::gateway::transport::Transport;

enum Phase {
    Searching,
    Resolving { id: String },
    Done(Result<ProviderPayload, GatewayError>),
}

/// Runs a two-phase lookup for an already validated request.
///
/// # Arguments
/// * `transport` - Network capability used for both calls
/// * `provider` - Descriptor supplying base URL and credential
/// * `lookup` - Search endpoint, match list location, identifier field and resolve endpoint
/// * `params` - Validated parameters; the search uses the name, the resolve may use the rest
///
/// # Returns
/// * `Ok(ProviderPayload)` - The resolve call's body, unmodified
/// * `Err(GatewayError)` - The first failure of either phase, or `NotFound`
///   when the search matched nothing (the resolve call is then never made)
///
/// # Notes
/// - Ties between same-named entities go to the first entry in the provider's
///   own ordering; there is no re-ranking
/// - Nothing is cached; every invocation repeats both phases
#[instrument(skip_all, fields(provider = %provider.id))]
pub async fn execute_two_phase(
    transport: &dyn Transport,
    provider: &ProviderDescriptor,
    lookup: &TwoPhaseLookup,
    params: &ResolvedParams,
) -> Result<ProviderPayload, GatewayError> {
    let mut phase = Phase::Searching;
    loop {
        phase = match phase {
            Phase::Searching => match search(transport, provider, lookup, params).await {
                Ok(LookupResult::Found(id)) => {
                    debug!("Search matched identifier {id}, resolving");
                    Phase::Resolving { id }
                }
                Ok(LookupResult::NotFound) => {
                    info!("{} search returned no matches", provider.id);
                    Phase::Done(Err(GatewayError::not_found(lookup.matches.not_found)))
                }
                Err(e) => Phase::Done(Err(e)),
            },
            Phase::Resolving { id } => {
                let call = build_call(provider, &lookup.resolve, |name| {
                    if name == LOOKUP_ID_PLACEHOLDER {
                        Some(id.as_str())
                    } else {
                        params.lookup(name)
                    }
                });
                Phase::Done(fetch(transport, &call, &lookup.resolve).await)
            }
            Phase::Done(outcome) => return outcome,
        };
    }
}

async fn search(
    transport: &dyn Transport,
    provider: &ProviderDescriptor,
    lookup: &TwoPhaseLookup,
    params: &ResolvedParams,
) -> Result<LookupResult, GatewayError> {
    let call = build_call(provider, &lookup.search, |name| params.lookup(name));
    let payload = fetch(transport, &call, &lookup.search).await?;
    let value = payload.value()?;
    first_identifier(&value, lookup, provider.id)
}

/// Picks the identifier of the first match, in provider order.
pub(crate) fn first_identifier(
    value: &Value,
    lookup: &TwoPhaseLookup,
    provider: ProviderId,
) -> Result<LookupResult, GatewayError> {
    let matches = matches_in(value, &lookup.matches, provider, lookup.search.label)?;
    let Some(first) = matches.first() else {
        return Ok(LookupResult::NotFound);
    };

    match first.get(lookup.id_field) {
        Some(Value::Number(n)) => Ok(LookupResult::Found(n.to_string())),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(LookupResult::Found(s.clone())),
        _ => Err(GatewayError::malformed_response(
            provider.as_str(),
            format!(
                "First {provider} {} match has no usable '{}' field",
                lookup.search.label, lookup.id_field
            ),
            Some(preview(&first.to_string())),
        )),
    }
}
