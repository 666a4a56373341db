// ── Runtime connection configuration ──
//
// These types describe *how* to talk to one System Management Controller.
// They carry credential data and timing, but never touch disk.
// The CLI (or any other host) constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use smclink_api::transport::{DEFAULT_GET_TIMEOUT, DEFAULT_POST_TIMEOUT};
use smclink_api::{BasicAuth, TransportConfig};

/// Interval between poll ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Configuration for one device instance.
///
/// Replaced wholesale on update; the Basic-auth token is derived from
/// `username` / `password` every time via [`credentials`](Self::credentials).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// IP address (optionally `host:port`) of the SMC. Empty means unconfigured.
    pub target_address: String,
    /// Username for command (POST) requests.
    pub username: String,
    /// Password for command (POST) requests.
    pub password: SecretString,
    /// Poll tick interval. `Duration::ZERO` disables polling.
    pub poll_interval: Duration,
    /// Timeout for every GET.
    pub get_timeout: Duration,
    /// Timeout for every POST.
    pub post_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target_address: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            get_timeout: DEFAULT_GET_TIMEOUT,
            post_timeout: DEFAULT_POST_TIMEOUT,
        }
    }
}

impl ControllerConfig {
    pub fn new(
        target_address: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            target_address: target_address.into(),
            username: username.into(),
            password,
            ..Self::default()
        }
    }

    /// Disable the repeating poll (single request/response use).
    pub fn one_shot(mut self) -> Self {
        self.poll_interval = Duration::ZERO;
        self
    }

    pub fn has_address(&self) -> bool {
        !self.target_address.trim().is_empty()
    }

    /// Derive the Basic-auth credential.
    pub fn credentials(&self) -> BasicAuth {
        BasicAuth::new(&self.username, &self.password)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            get_timeout: self.get_timeout,
            post_timeout: self.post_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_are_unconfigured() {
        let config = ControllerConfig::default();
        assert!(!config.has_address());
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.get_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn credentials_follow_current_values() {
        let mut config =
            ControllerConfig::new("10.0.0.5", "admin", SecretString::from("one".to_string()));
        let first = config.credentials();
        config.password = SecretString::from("two".to_string());
        let second = config.credentials();
        assert_ne!(first.token().expose_secret(), second.token().expose_secret());
    }

    #[test]
    fn one_shot_disables_polling() {
        let config = ControllerConfig::default().one_shot();
        assert!(config.poll_interval.is_zero());
    }
}
