//! Provider descriptors and the startup-time credential snapshot.
//!
//! Each upstream API is described once: where it lives, how it wants to be
//! authenticated and which secret carries the credential. The table is built
//! at startup from defaults plus configuration overrides and is never mutated
//! afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use http::{HeaderMap, HeaderName, HeaderValue, header::AUTHORIZATION};
use reqwest::Url;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::gateway::template::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderId {
    Balldontlie,
    ApiFootball,
    FootballData,
    PandaScore,
    TheOddsApi,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Balldontlie,
        ProviderId::ApiFootball,
        ProviderId::FootballData,
        ProviderId::PandaScore,
        ProviderId::TheOddsApi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Balldontlie => "balldontlie",
            ProviderId::ApiFootball => "api_football",
            ProviderId::FootballData => "football_data",
            ProviderId::PandaScore => "pandascore",
            ProviderId::TheOddsApi => "the_odds_api",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderId::Balldontlie => "https://www.balldontlie.io/api/v1",
            ProviderId::ApiFootball => "https://v3.football.api-sports.io",
            ProviderId::FootballData => "https://api.football-data.org/v4",
            ProviderId::PandaScore => "https://api.pandascore.co",
            ProviderId::TheOddsApi => "https://api.the-odds-api.com/v4",
        }
    }

    pub fn auth_scheme(self) -> AuthScheme {
        match self {
            ProviderId::Balldontlie => AuthScheme::HeaderApiKey {
                header: "authorization",
            },
            ProviderId::ApiFootball => AuthScheme::HeaderApiKey {
                header: "x-apisports-key",
            },
            ProviderId::FootballData => AuthScheme::HeaderApiKey {
                header: "x-auth-token",
            },
            ProviderId::PandaScore => AuthScheme::HeaderBearer,
            ProviderId::TheOddsApi => AuthScheme::QueryParamKey { param: "apiKey" },
        }
    }

    /// Name of the external secret holding this provider's credential.
    pub fn credential_key(self) -> &'static str {
        match self {
            ProviderId::Balldontlie => "BALLDONTLIE_API_KEY",
            ProviderId::ApiFootball => "API_FOOTBALL_KEY",
            ProviderId::FootballData => "FOOTBALL_DATA_API_KEY",
            ProviderId::PandaScore => "PANDASCORE_TOKEN",
            ProviderId::TheOddsApi => "ODDS_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

/// How a provider expects its credential to be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <credential>`
    HeaderBearer,
    /// `<header>: <credential>`
    HeaderApiKey { header: &'static str },
    /// `?<param>=<credential>`
    QueryParamKey { param: &'static str },
}

/// Immutable snapshot of provider credentials, keyed by credential key.
#[derive(Clone, Default)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    /// Reads every provider's credential key from the process environment.
    /// Missing credentials are logged and left out; the provider is then
    /// called without one.
    pub fn from_env() -> Result<Self, AppError> {
        let mut values = BTreeMap::new();
        for provider in ProviderId::ALL {
            let key = provider.credential_key();
            match std::env::var(key) {
                Ok(value) if !value.trim().is_empty() => {
                    values.insert(key.to_string(), value.trim().to_string());
                }
                _ => warn!(
                    "No credential found in {} - {} calls will be unauthenticated",
                    key, provider
                ),
            }
        }
        Self::from_pairs(values)
    }

    /// Builds a snapshot from explicit `(credential_key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, AppError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for (key, value) in &values {
            if HeaderValue::from_str(value).is_err() {
                return Err(AppError::config_error(format!(
                    "Credential {key} contains characters that cannot be sent in a header"
                )));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|k| (k, "***")))
            .finish()
    }
}

/// Static metadata for one provider, with its credential already injected.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub base_url: Url,
    pub auth: AuthScheme,
    pub credential_key: &'static str,
    credential: Option<String>,
}

impl ProviderDescriptor {
    pub fn new(id: ProviderId, base_url: Url, credential: Option<String>) -> Self {
        Self {
            id,
            base_url,
            auth: id.auth_scheme(),
            credential_key: id.credential_key(),
            credential,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Query parameter that carries the credential, for log redaction.
    pub fn secret_query_param(&self) -> Option<&'static str> {
        match self.auth {
            AuthScheme::QueryParamKey { param } => Some(param),
            _ => None,
        }
    }

    /// Attaches the credential to an outbound call according to the auth scheme.
    pub fn authorize(&self, url: &mut Url, headers: &mut HeaderMap) -> Result<(), TemplateError> {
        let Some(credential) = self.credential.as_deref() else {
            return Ok(());
        };
        let invalid = || TemplateError::InvalidCredential {
            provider: self.id.to_string(),
        };
        match self.auth {
            AuthScheme::HeaderBearer => {
                let value = HeaderValue::from_str(&format!("Bearer {credential}"))
                    .map_err(|_| invalid())?;
                headers.insert(AUTHORIZATION, value);
            }
            AuthScheme::HeaderApiKey { header } => {
                let value = HeaderValue::from_str(credential).map_err(|_| invalid())?;
                headers.insert(HeaderName::from_static(header), value);
            }
            AuthScheme::QueryParamKey { param } => {
                url.query_pairs_mut().append_pair(param, credential);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .field("credential_key", &self.credential_key)
            .field("has_credential", &self.credential.is_some())
            .finish()
    }
}

/// Every provider descriptor, built once at startup.
#[derive(Debug, Clone)]
pub struct ProviderTable {
    descriptors: HashMap<ProviderId, ProviderDescriptor>,
}

impl ProviderTable {
    /// Builds the table from defaults, applying base URL overrides from
    /// configuration and injecting credentials.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, AppError> {
        let mut descriptors = HashMap::new();
        for id in ProviderId::ALL {
            let base = config
                .provider_base_url(id)
                .unwrap_or_else(|| id.default_base_url());
            let base_url = parse_base_url(id, base)?;
            let credential = credentials.get(id.credential_key()).map(str::to_string);
            let descriptor = ProviderDescriptor::new(id, base_url, credential);
            info!(
                "Provider {} at {} (credential: {})",
                id,
                descriptor.base_url,
                if descriptor.has_credential() { "set" } else { "missing" }
            );
            descriptors.insert(id, descriptor);
        }
        Ok(Self { descriptors })
    }

    pub fn descriptor(&self, id: ProviderId) -> &ProviderDescriptor {
        // from_config inserts every ProviderId::ALL entry
        &self.descriptors[&id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        ProviderId::ALL.into_iter().map(|id| self.descriptor(id))
    }
}

fn parse_base_url(id: ProviderId, base: &str) -> Result<Url, AppError> {
    let url = Url::parse(base).map_err(|e| {
        AppError::config_error(format!("Invalid base URL '{base}' for {id}: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::config_error(format!(
            "Base URL for {id} must be an http(s) URL, got '{base}'"
        )));
    }
    Ok(url)
}
