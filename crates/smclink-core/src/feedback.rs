// ── Feedback evaluation ──
//
// Pure predicates over the current `DeviceState`. An unknown input never
// matches, so a button never lights before the device has answered.

use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::DeviceState;
use crate::registry::FeedbackKind;

/// Expected system power state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PowerState {
    #[default]
    On,
    Off,
}

/// A feedback with its options resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// True when system power matches `state`.
    Power { state: PowerState },
    /// True when the aggregate power fault matches `active`.
    PowerFault { active: bool },
}

impl Feedback {
    /// Resolve a feedback from its identifier and option object.
    /// Missing options take their registry defaults.
    pub fn from_options(name: &str, options: &Value) -> Result<Self, CoreError> {
        let kind: FeedbackKind = name.parse().map_err(|_| CoreError::UnknownFeedback {
            name: name.to_owned(),
        })?;
        let state = options.get("state").filter(|v| !v.is_null());

        match kind {
            FeedbackKind::Power => {
                let state = match state {
                    None => PowerState::default(),
                    Some(Value::String(s)) => s.parse().map_err(|_| {
                        CoreError::validation("state", format!("expected on|off, got \"{s}\""))
                    })?,
                    Some(Value::Bool(true)) => PowerState::On,
                    Some(Value::Bool(false)) => PowerState::Off,
                    Some(other) => {
                        return Err(CoreError::validation(
                            "state",
                            format!("expected on|off, got {other}"),
                        ));
                    }
                };
                Ok(Self::Power { state })
            }
            FeedbackKind::PowerFault => {
                let active = match state {
                    None => true,
                    Some(Value::Bool(b)) => *b,
                    Some(Value::String(s)) if s == "true" => true,
                    Some(Value::String(s)) if s == "false" => false,
                    Some(other) => {
                        return Err(CoreError::validation(
                            "state",
                            format!("expected true|false, got {other}"),
                        ));
                    }
                };
                Ok(Self::PowerFault { active })
            }
        }
    }

    pub fn kind(&self) -> FeedbackKind {
        match self {
            Self::Power { .. } => FeedbackKind::Power,
            Self::PowerFault { .. } => FeedbackKind::PowerFault,
        }
    }

    pub fn evaluate(&self, state: &DeviceState) -> bool {
        match *self {
            Self::Power { state: expected } => state
                .system_power
                .is_some_and(|on| on == (expected == PowerState::On)),
            Self::PowerFault { active } => state.power_fault.is_some_and(|f| f == active),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn powered(on: bool, fault: bool) -> DeviceState {
        DeviceState {
            system_power: Some(on),
            power_fault: Some(fault),
            ..DeviceState::default()
        }
    }

    #[test]
    fn power_feedback_matches_requested_state() {
        let on = Feedback::from_options("power", &json!({"state": "on"})).unwrap();
        let off = Feedback::from_options("power", &json!({"state": "off"})).unwrap();

        assert!(on.evaluate(&powered(true, false)));
        assert!(!off.evaluate(&powered(true, false)));
        assert!(off.evaluate(&powered(false, false)));
    }

    #[test]
    fn power_fault_accepts_string_or_bool() {
        let by_string = Feedback::from_options("power_fault", &json!({"state": "true"})).unwrap();
        let by_bool = Feedback::from_options("power_fault", &json!({"state": true})).unwrap();
        assert_eq!(by_string, by_bool);

        let cleared = Feedback::from_options("power_fault", &json!({"state": "false"})).unwrap();
        assert!(cleared.evaluate(&powered(true, false)));
        assert!(!cleared.evaluate(&powered(true, true)));
    }

    #[test]
    fn unknown_inputs_never_match() {
        let unknown = DeviceState::default();
        for options in [json!({"state": "on"}), json!({"state": "off"})] {
            let fb = Feedback::from_options("power", &options).unwrap();
            assert!(!fb.evaluate(&unknown));
        }
        for options in [json!({"state": "true"}), json!({"state": "false"})] {
            let fb = Feedback::from_options("power_fault", &options).unwrap();
            assert!(!fb.evaluate(&unknown));
        }
    }

    #[test]
    fn defaults_apply_when_options_missing() {
        assert_eq!(
            Feedback::from_options("power", &json!({})).unwrap(),
            Feedback::Power {
                state: PowerState::On
            }
        );
        assert_eq!(
            Feedback::from_options("power_fault", &Value::Null).unwrap(),
            Feedback::PowerFault { active: true }
        );
    }

    #[test]
    fn rejects_unknown_feedback_and_bad_state() {
        assert!(matches!(
            Feedback::from_options("temperature", &json!({})),
            Err(CoreError::UnknownFeedback { .. })
        ));
        assert!(matches!(
            Feedback::from_options("power", &json!({"state": "maybe"})),
            Err(CoreError::Validation { .. })
        ));
    }
}
