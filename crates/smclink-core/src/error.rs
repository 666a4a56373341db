// ── Core error types ──
//
// User-facing errors from smclink-core. Consumers never match on reqwest or
// serde errors directly: the `From<smclink_api::Error>` impl folds
// transport-layer failures into the configuration / transport / protocol
// taxonomy that drives connection health.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Health-affecting errors ──────────────────────────────────────
    /// The target address is missing or unusable.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Connect, DNS or timeout failure.
    #[error("Cannot reach device: {message}")]
    Transport { message: String, timed_out: bool },

    /// Non-success HTTP status or malformed JSON body.
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        /// HTTP status code (if the device answered).
        status: Option<u16>,
    },

    // ── Dispatch-boundary errors ─────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("Unknown feedback: {name}")]
    UnknownFeedback { name: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Controller is not running")]
    ControllerNotRunning,
}

impl CoreError {
    /// Errors that mark the connection as failed (as opposed to bad input).
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Protocol { .. })
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smclink_api::Error> for CoreError {
    fn from(err: smclink_api::Error) -> Self {
        match err {
            smclink_api::Error::InvalidAddress { .. } | smclink_api::Error::ClientBuild(_) => {
                CoreError::Configuration {
                    message: err.to_string(),
                }
            }
            smclink_api::Error::Timeout { .. } => CoreError::Transport {
                message: err.to_string(),
                timed_out: true,
            },
            smclink_api::Error::Transport(ref e) => CoreError::Transport {
                message: e.to_string(),
                timed_out: e.is_timeout(),
            },
            smclink_api::Error::Status { status, .. } => CoreError::Protocol {
                message: err.to_string(),
                status: Some(status),
            },
            smclink_api::Error::Deserialization { message, body: _ } => CoreError::Protocol {
                message: format!("malformed JSON body: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_protocol() {
        let err = CoreError::from(smclink_api::Error::Status {
            status: 503,
            body: "busy".into(),
        });
        assert!(matches!(err, CoreError::Protocol { status: Some(503), .. }));
        assert!(err.is_connection_failure());
    }

    #[test]
    fn timeout_maps_to_transport() {
        let err = CoreError::from(smclink_api::Error::Timeout { timeout_ms: 2000 });
        assert!(matches!(err, CoreError::Transport { timed_out: true, .. }));
    }

    #[test]
    fn invalid_address_maps_to_configuration() {
        let err = CoreError::from(smclink_api::Error::InvalidAddress {
            address: String::new(),
            reason: "address is empty".into(),
        });
        assert!(matches!(err, CoreError::Configuration { .. }));
        assert!(!err.is_connection_failure());
    }
}
