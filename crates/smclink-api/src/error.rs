use thiserror::Error;

/// Top-level error type for the `smclink-api` crate.
///
/// Every failure of a single GET or POST lands in one of these variants.
/// `smclink-core` folds them into its configuration / transport / protocol
/// taxonomy via [`Error::is_transport`] and [`Error::is_protocol`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// The target address could not be turned into a base URL.
    #[error("Invalid target address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Protocol ────────────────────────────────────────────────────
    /// The device answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for connect / DNS / timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }

    /// Returns `true` when the device answered but the answer was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Deserialization { .. })
    }

    /// Returns `true` when the request never left because of bad settings.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. } | Self::ClientBuild(_))
    }

    /// HTTP status code, if the device produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_protocol_errors() {
        let err = Error::Status {
            status: 500,
            body: "boom".into(),
        };
        assert!(err.is_protocol());
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn timeouts_are_transport_errors() {
        let err = Error::Timeout { timeout_ms: 2000 };
        assert!(err.is_transport());
        assert!(!err.is_protocol());
        assert_eq!(err.to_string(), "Request timed out after 2000ms");
    }

    #[test]
    fn bad_addresses_are_configuration_errors() {
        let err = Error::InvalidAddress {
            address: "::".into(),
            reason: "empty host".into(),
        };
        assert!(err.is_configuration());
        assert!(err.status().is_none());
    }
}
