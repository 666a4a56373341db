// Wire payloads for the SMC REST API.
//
// GET bodies are decoded leniently (identity strings may arrive as numbers);
// POST bodies serialize to exactly the field names the firmware expects.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

// ── GET payloads ────────────────────────────────────────────────────

/// `GET /api/localmachine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMachine {
    #[serde(deserialize_with = "string_or_number")]
    pub serial: String,
    #[serde(deserialize_with = "string_or_number")]
    pub hostname: String,
    #[serde(rename = "type", deserialize_with = "string_or_number")]
    pub machine_type: String,
}

/// `GET /api/chassis/power/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PowerStatus {
    #[serde(rename = "System Power")]
    pub system_power: bool,
    #[serde(rename = "Power Overload")]
    pub power_overload: bool,
    #[serde(rename = "Main Power Fault")]
    pub main_power_fault: bool,
    #[serde(rename = "Power Control Fault")]
    pub power_control_fault: bool,
}

impl PowerStatus {
    /// Any of the three fault conditions is active.
    pub fn any_fault(&self) -> bool {
        self.power_overload || self.main_power_fault || self.power_control_fault
    }
}

/// `GET /api/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "string_or_number")]
    pub role: String,
}

/// `GET /api/ledstrip` (and the echo of `POST /api/ledstrip`).
///
/// The mode is kept as a raw string: firmware may report modes this client
/// cannot set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedStrip {
    #[serde(rename = "ledMode")]
    pub mode: String,
    #[serde(rename = "ledR")]
    pub red: u8,
    #[serde(rename = "ledG")]
    pub green: u8,
    #[serde(rename = "ledB")]
    pub blue: u8,
}

// ── POST payloads ───────────────────────────────────────────────────

/// LED strip animation mode accepted by `POST /api/ledstrip`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedMode {
    #[default]
    Static,
    ColourId,
    Rainbow,
}

/// `POST /api/ledstrip`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedStripSettings {
    #[serde(rename = "ledMode")]
    pub mode: LedMode,
    #[serde(rename = "ledR")]
    pub red: u8,
    #[serde(rename = "ledG")]
    pub green: u8,
    #[serde(rename = "ledB")]
    pub blue: u8,
}

/// `POST /api/oled/notification/time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTiming {
    /// Seconds the notification stays on the LCD.
    pub time: u8,
}

/// `POST /api/oled/notification`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub priority: u8,
    pub title: String,
    pub message: String,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
