// Shared transport configuration for building reqwest::Client instances.
//
// Timeouts are per verb: polling GETs must fail fast so a dead device is
// noticed within one tick, while POSTs (power operations) may take longer.

use std::time::Duration;

/// Fixed timeout applied to every GET.
pub const DEFAULT_GET_TIMEOUT: Duration = Duration::from_millis(2000);

/// Timeout applied to every POST.
pub const DEFAULT_POST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub get_timeout: Duration,
    pub post_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            get_timeout: DEFAULT_GET_TIMEOUT,
            post_timeout: DEFAULT_POST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The client itself carries no timeout; each verb applies its own on
    /// the request builder.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .user_agent(concat!("smclink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }
}
