//! Provider adapters: single calls and two-phase lookups, sharing one set of
//! outcome classification rules.

mod classify;
pub mod single_call;
pub mod two_phase;

pub use classify::ProviderPayload;
pub use single_call::execute_single;
pub use two_phase::execute_two_phase;
