// ── Command API ──
//
// All write operations flow through a unified `Command` enum. Each command
// plans one or more POSTs; the controller sends them in order and feeds
// every completion through the same epoch/health path as a poll.

pub mod params;

use serde::Serialize;
use serde_json::Value;
use smclink_api::models::{LedStripSettings, Notification, NotificationTiming};
use smclink_api::paths;

use crate::error::CoreError;
use crate::registry::ActionKind;

pub use params::{LedStripRequest, NotificationRequest};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against an SMC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Chassis power ────────────────────────────────────────────────
    PowerOn,
    PowerOff,
    PowerCycle,

    // ── Front panel ──────────────────────────────────────────────────
    /// Identify the machine by flashing its LCD.
    FlashLcd,
    SendNotification(NotificationRequest),
    SetLedStrip(LedStripRequest),
}

impl Command {
    /// Resolve a command from its action identifier and option object.
    pub fn from_options(name: &str, options: &Value) -> Result<Self, CoreError> {
        let kind: ActionKind = name.parse().map_err(|_| CoreError::UnknownCommand {
            name: name.to_owned(),
        })?;
        Ok(match kind {
            ActionKind::PowerOn => Self::PowerOn,
            ActionKind::PowerOff => Self::PowerOff,
            ActionKind::PowerCycle => Self::PowerCycle,
            ActionKind::FlashLcd => Self::FlashLcd,
            ActionKind::SendNotification => {
                Self::SendNotification(NotificationRequest::from_options(options)?)
            }
            ActionKind::SetLedStrip => Self::SetLedStrip(LedStripRequest::from_options(options)?),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::PowerOn => ActionKind::PowerOn,
            Self::PowerOff => ActionKind::PowerOff,
            Self::PowerCycle => ActionKind::PowerCycle,
            Self::FlashLcd => ActionKind::FlashLcd,
            Self::SendNotification(_) => ActionKind::SendNotification,
            Self::SetLedStrip(_) => ActionKind::SetLedStrip,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::SendNotification(request) => request.validate(),
            _ => Ok(()),
        }
    }

    /// The POSTs this command issues, in send order.
    pub fn plan(&self) -> Vec<PlannedRequest> {
        match self {
            Self::PowerOn => vec![PlannedRequest::empty(paths::POWER_ON)],
            Self::PowerOff => vec![PlannedRequest::empty(paths::POWER_OFF)],
            Self::PowerCycle => vec![PlannedRequest::empty(paths::POWER_CYCLE)],
            Self::FlashLcd => vec![PlannedRequest::empty(paths::WHO_AM_I)],
            Self::SendNotification(request) => vec![
                PlannedRequest {
                    path: paths::NOTIFICATION_TIME,
                    body: PostBody::Timing(request.timing()),
                },
                PlannedRequest {
                    path: paths::NOTIFICATION,
                    body: PostBody::Notification(request.notification()),
                },
            ],
            Self::SetLedStrip(request) => vec![PlannedRequest {
                path: paths::LED_STRIP,
                body: PostBody::LedStrip(request.settings()),
            }],
        }
    }
}

// ── Request plan ─────────────────────────────────────────────────────

/// One outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub path: &'static str,
    pub body: PostBody,
}

impl PlannedRequest {
    fn empty(path: &'static str) -> Self {
        Self {
            path,
            body: PostBody::Empty(EmptyBody {}),
        }
    }
}

/// Serializes to `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PostBody {
    Empty(EmptyBody),
    Timing(NotificationTiming),
    Notification(Notification),
    LedStrip(LedStripSettings),
}

// ── Results ──────────────────────────────────────────────────────────

/// Outcome of one POST in a command.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub path: &'static str,
    pub result: Result<Value, CoreError>,
}

/// Result of a command: every planned POST, sent or failed, in order.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub requests: Vec<RequestOutcome>,
}

impl CommandResult {
    pub fn succeeded(&self) -> bool {
        self.requests.iter().all(|r| r.result.is_ok())
    }

    /// The first failure, if any.
    pub fn first_error(&self) -> Option<&CoreError> {
        self.requests.iter().find_map(|r| r.result.as_ref().err())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn bodies(command: &Command) -> Vec<(&'static str, Value)> {
        command
            .plan()
            .into_iter()
            .map(|r| (r.path, serde_json::to_value(&r.body).unwrap()))
            .collect()
    }

    #[test]
    fn power_commands_post_empty_objects() {
        assert_eq!(
            bodies(&Command::PowerCycle),
            vec![("/api/chassis/power/cycle", json!({}))]
        );
        assert_eq!(
            bodies(&Command::FlashLcd),
            vec![("/api/chassis/whoami", json!({}))]
        );
    }

    #[test]
    fn notification_plans_timing_then_message() {
        let command = Command::from_options(
            "send_notification",
            &json!({"duration": 10, "priority": 1, "title": "T", "message": "M"}),
        )
        .unwrap();
        assert_eq!(
            bodies(&command),
            vec![
                ("/api/oled/notification/time", json!({"time": 10})),
                (
                    "/api/oled/notification",
                    json!({"priority": 1, "title": "T", "message": "M"})
                ),
            ]
        );
    }

    #[test]
    fn led_strip_plan_uses_firmware_field_names() {
        let command = Command::from_options(
            "set_strip",
            &json!({"mode": "static", "red": 10, "green": 20, "blue": 30}),
        )
        .unwrap();
        assert_eq!(
            bodies(&command),
            vec![(
                "/api/ledstrip",
                json!({"ledMode": "static", "ledR": 10, "ledG": 20, "ledB": 30})
            )]
        );
    }

    #[test]
    fn aliases_resolve_to_canonical_commands() {
        assert_eq!(
            Command::from_options("who_am_i", &Value::Null).unwrap(),
            Command::FlashLcd
        );
        assert_eq!(
            Command::from_options("notification", &json!({})).unwrap().kind(),
            ActionKind::SendNotification
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            Command::from_options("reboot", &json!({})),
            Err(CoreError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn command_result_reports_first_error() {
        let result = CommandResult {
            requests: vec![
                RequestOutcome {
                    path: paths::NOTIFICATION_TIME,
                    result: Err(CoreError::Protocol {
                        message: "HTTP 500".into(),
                        status: Some(500),
                    }),
                },
                RequestOutcome {
                    path: paths::NOTIFICATION,
                    result: Ok(json!({})),
                },
            ],
        };
        assert!(!result.succeeded());
        assert!(matches!(
            result.first_error(),
            Some(CoreError::Protocol { status: Some(500), .. })
        ));
    }
}
