use serde::Serialize;
use strum::Display;

/// Connection status surfaced to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionHealth {
    /// Not started, or destroyed.
    #[default]
    Disconnected,
    /// No usable target address.
    BadConfig,
    /// The latest completed request failed.
    ConnectionFailure,
    Ok,
}

impl ConnectionHealth {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Status plus the human-readable reason for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub status: ConnectionHealth,
    pub message: Option<String>,
}

impl HealthSnapshot {
    pub fn new(status: ConnectionHealth, message: Option<String>) -> Self {
        Self { status, message }
    }
}
