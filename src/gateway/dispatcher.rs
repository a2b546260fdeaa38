//! Route dispatcher: one entry point per logical request.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::gateway::adapters::{execute_single, execute_two_phase};
use crate::gateway::models::LogicalRequest;
use crate::gateway::normalizer::{Envelope, normalize};
use crate::gateway::providers::ProviderTable;
use crate::gateway::routes::{OperationRule, Plan, ROUTES, rule_for, verify_routes};
use crate::gateway::transport::Transport;
use crate::gateway::validation::validate;

/// Shared, read-only request handling state: provider descriptors and the
/// transport. Cloning is cheap and every clone sees the same table.
#[derive(Clone)]
pub struct Gateway {
    providers: Arc<ProviderTable>,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    /// Creates the gateway after checking the static route table.
    ///
    /// # Returns
    /// * `Ok(Gateway)` - Ready to dispatch
    /// * `Err(AppError::Config)` - The route table references unbound placeholders
    ///   or does not map every operation exactly once
    pub fn new(providers: ProviderTable, transport: Arc<dyn Transport>) -> Result<Self, AppError> {
        verify_routes(ROUTES)?;
        Ok(Self {
            providers: Arc::new(providers),
            transport,
        })
    }

    pub fn providers(&self) -> &ProviderTable {
        &self.providers
    }

    /// Handles one logical request end to end: validation, adapter, normalization.
    #[instrument(skip_all, fields(operation = %request.operation()))]
    pub async fn dispatch(&self, request: &LogicalRequest) -> Envelope {
        let rule = rule_for(request.operation());
        let outcome = match validate(rule, request) {
            Ok(params) => {
                let provider = self.providers.descriptor(rule.provider);
                let transport = self.transport.as_ref();
                match &rule.plan {
                    Plan::Single(endpoint) => {
                        execute_single(transport, provider, endpoint, &params).await
                    }
                    Plan::TwoPhase(lookup) => {
                        execute_two_phase(transport, provider, lookup, &params).await
                    }
                }
            }
            Err(e) => {
                warn!("Rejected {}: {}", rule.operation, e);
                Err(e)
            }
        };

        let envelope = normalize(outcome, rule.status_policy);
        info!("{} answered with HTTP {}", rule.operation, envelope.status);
        envelope
    }

    /// Rule describing an operation, for callers that need its metadata.
    pub fn rule(&self, request: &LogicalRequest) -> &'static OperationRule {
        rule_for(request.operation())
    }
}
