// ── Response ingestion ──
//
// Maps `(path, body)` onto `DeviceState` field groups. A body that does not
// decode as its endpoint's payload leaves the group untouched.

use serde::de::DeserializeOwned;
use serde_json::Value;
use smclink_api::Endpoint;
use smclink_api::models::{LedStrip, LocalMachine, PowerStatus, Session};
use tracing::debug;

use crate::model::DeviceState;
use crate::registry::{FeedbackKind, Variable};

/// Fields touched by one ingested response.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Ingested {
    pub variables: Vec<Variable>,
    pub feedbacks: Vec<FeedbackKind>,
}

impl Ingested {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.feedbacks.is_empty()
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &Value) -> Option<T> {
    if body.is_null() {
        return None;
    }
    match serde_json::from_value::<T>(body.clone()) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!(path, error = %e, "response skipped: unexpected payload shape");
            None
        }
    }
}

/// Apply one response to `device`. Paths outside the poll set are ignored.
pub(super) fn apply(device: &mut DeviceState, path: &str, body: &Value) -> Ingested {
    let Some(endpoint) = Endpoint::from_path(path) else {
        return Ingested::default();
    };

    match endpoint {
        Endpoint::LocalMachine => decode::<LocalMachine>(path, body)
            .map(|m| Ingested {
                variables: device.apply_local_machine(m),
                feedbacks: Vec::new(),
            })
            .unwrap_or_default(),
        Endpoint::PowerStatus => decode::<PowerStatus>(path, body)
            .map(|s| Ingested {
                variables: device.apply_power_status(s),
                feedbacks: vec![FeedbackKind::Power, FeedbackKind::PowerFault],
            })
            .unwrap_or_default(),
        // Reserved endpoint: polled, never ingested.
        Endpoint::Vfcs => Ingested::default(),
        Endpoint::Session => decode::<Session>(path, body)
            .map(|s| Ingested {
                variables: device.apply_session(s),
                feedbacks: Vec::new(),
            })
            .unwrap_or_default(),
        Endpoint::LedStrip => decode::<LedStrip>(path, body)
            .map(|s| Ingested {
                variables: device.apply_led_strip(s),
                feedbacks: Vec::new(),
            })
            .unwrap_or_default(),
    }
}
