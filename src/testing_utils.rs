use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::config::{Config, ProviderOverride};
use crate::gateway::dispatcher::Gateway;
use crate::gateway::providers::{Credentials, ProviderDescriptor, ProviderId, ProviderTable};
use crate::gateway::transport::{OutboundCall, Transport, TransportError, TransportResponse};

/// What a [`FakeTransport`] answers for a given path.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond(TransportResponse),
    Fail(TransportError),
}

impl ScriptedReply {
    /// Replies with the given status and body text, verbatim.
    pub fn raw(status: u16, body: &str) -> Self {
        Self::Respond(TransportResponse::new(status, body))
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond(TransportResponse::new(status, body.to_string()))
    }

    pub fn fail(error: TransportError) -> Self {
        Self::Fail(error)
    }
}

#[derive(Default)]
struct FakeState {
    replies: HashMap<String, ScriptedReply>,
    calls: Vec<OutboundCall>,
}

/// In-memory [`Transport`] for tests.
///
/// Replies are keyed by exact URL path and repeat on every call to that path.
/// Paths without a scripted reply fail as a connection error. Clones share the
/// script and the recorded calls, so a test can keep a handle after moving one
/// into a gateway.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reply for a path, replacing any earlier one.
    pub fn on(self, path: &str, reply: ScriptedReply) -> Self {
        self.lock().replies.insert(path.to_string(), reply);
        self
    }

    /// Every call sent so far, in order.
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls sent to an exact path.
    pub fn calls_to(&self, path: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.url.path() == path)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        // A panicking test thread must not hide the calls recorded so far
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, call: &OutboundCall) -> Result<TransportResponse, TransportError> {
        let mut state = self.lock();
        state.calls.push(call.clone());
        match state.replies.get(call.url.path()) {
            Some(ScriptedReply::Respond(response)) => Ok(response.clone()),
            Some(ScriptedReply::Fail(error)) => Err(error.clone()),
            None => Err(TransportError::Connect(format!(
                "no scripted reply for {}",
                call.url.path()
            ))),
        }
    }
}

fn test_base_url(id: ProviderId) -> String {
    format!("http://{}.test", id.as_str().replace('_', "-"))
}

/// Descriptor for `id` rooted at `http://<id>.test`, with no credential, so
/// outbound paths equal endpoint paths.
pub fn test_provider(id: ProviderId) -> ProviderDescriptor {
    let base_url = Url::parse(&test_base_url(id)).expect("test base URL is valid");
    ProviderDescriptor::new(id, base_url, None)
}

/// Configuration pointing every provider at `base_url`.
pub fn config_with_base_url(base_url: &str) -> Config {
    let mut config = Config::default();
    for id in ProviderId::ALL {
        config.providers.insert(
            id.as_str().to_string(),
            ProviderOverride {
                base_url: Some(base_url.to_string()),
            },
        );
    }
    config
}

/// Configuration pointing each provider at its own `http://<id>.test` host.
pub fn test_config() -> Config {
    let mut config = Config::default();
    for id in ProviderId::ALL {
        config.providers.insert(
            id.as_str().to_string(),
            ProviderOverride {
                base_url: Some(test_base_url(id)),
            },
        );
    }
    config
}

/// Gateway over [`test_config`] with no credentials and the given transport.
pub fn test_gateway(transport: FakeTransport) -> Gateway {
    let providers = ProviderTable::from_config(&test_config(), &Credentials::default())
        .expect("test provider table is valid");
    Gateway::new(providers, Arc::new(transport)).expect("route table is valid")
}
