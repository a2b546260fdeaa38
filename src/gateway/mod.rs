//! Provider gateway: route table, validation, adapters and normalization.

pub mod adapters;
pub mod dispatcher;
pub mod models;
pub mod normalizer;
pub mod providers;
pub mod routes;
pub mod template;
pub mod transport;
pub mod validation;

pub use dispatcher::Gateway;
pub use models::{LogicalRequest, Operation, Param};
pub use normalizer::{Envelope, EnvelopeBody};
pub use providers::{Credentials, ProviderId, ProviderTable};
pub use transport::{ReqwestTransport, Transport};
