//! Application-wide constants and configuration values
//!
//! This module centralizes the magic numbers and default values used by the
//! gateway so that they can be found and tuned in one place.

/// Default timeout for HTTP requests to providers in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per provider host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// User agent sent on every outbound provider call
pub const USER_AGENT: &str = concat!("sports_gateway/", env!("CARGO_PKG_VERSION"));

/// Default listener settings
pub mod server {
    /// Address the HTTP listener binds to when nothing else is configured
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

    /// Port the HTTP listener binds to when nothing else is configured
    pub const DEFAULT_PORT: u16 = 8081;

    /// Plain-text banner served at `/`
    pub const BANNER: &str = "Sports gateway is live!";
}

/// Limits applied when echoing provider bodies back to clients
pub mod response {
    /// Maximum number of characters of a malformed provider body included
    /// in the `raw_response` field of an error envelope
    pub const RAW_RESPONSE_PREVIEW_CHARS: usize = 500;
}

/// Parameter defaults for operations that do not require them
pub mod defaults {
    /// football-data.org competition code for the English Premier League
    pub const COMPETITION: &str = "PL";

    /// The Odds API pseudo-sport covering the next games across all sports
    pub const ODDS_SPORT: &str = "upcoming";

    pub const ODDS_REGION: &str = "us";

    /// Head-to-head (moneyline) market
    pub const ODDS_MARKET: &str = "h2h";
}

/// Environment variables recognised by the configuration loader
pub mod env_vars {
    pub const BIND_ADDRESS: &str = "SPORTS_GATEWAY_BIND";
    pub const PORT: &str = "SPORTS_GATEWAY_PORT";
    pub const HTTP_TIMEOUT: &str = "SPORTS_GATEWAY_HTTP_TIMEOUT";
    pub const LOG_FILE: &str = "SPORTS_GATEWAY_LOG_FILE";
}
