// ── Typed parameters for Command payloads ──
//
// Host option bags arrive as loose JSON objects. They are resolved here,
// once, into checked structs; nothing past this boundary sees raw options.

use serde_json::Value;
use smclink_api::models::{LedMode, LedStripSettings, Notification, NotificationTiming};

use crate::error::CoreError;

// ── Notification ─────────────────────────────────────────────────────

pub const PRIORITY_RANGE: (u8, u8) = (0, 2);
pub const DURATION_RANGE: (u8, u8) = (5, 30);
pub const DEFAULT_DURATION: u8 = 10;

/// `send_notification` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    /// 0–2
    pub priority: u8,
    /// Seconds on screen, 5–30.
    pub duration: u8,
}

impl Default for NotificationRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            priority: 0,
            duration: DEFAULT_DURATION,
        }
    }
}

impl NotificationRequest {
    pub fn from_options(options: &Value) -> Result<Self, CoreError> {
        let request = Self {
            title: text_option(options, "title")?,
            message: text_option(options, "message")?,
            priority: number_option(options, "priority", PRIORITY_RANGE, 0)?,
            duration: number_option(options, "duration", DURATION_RANGE, DEFAULT_DURATION)?,
        };
        Ok(request)
    }

    /// Check a request built in code rather than from an option bag.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("priority", u64::from(self.priority), PRIORITY_RANGE)?;
        check_range("duration", u64::from(self.duration), DURATION_RANGE)?;
        Ok(())
    }

    pub fn timing(&self) -> NotificationTiming {
        NotificationTiming {
            time: self.duration,
        }
    }

    pub fn notification(&self) -> Notification {
        Notification {
            priority: self.priority,
            title: self.title.clone(),
            message: self.message.clone(),
        }
    }
}

// ── LED strip ────────────────────────────────────────────────────────

/// `set_led_strip` parameters. Channels are `u8`, so 0–255 holds by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedStripRequest {
    pub mode: LedMode,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedStripRequest {
    pub fn from_options(options: &Value) -> Result<Self, CoreError> {
        let mode = match field(options, "mode") {
            None => LedMode::default(),
            Some(Value::String(s)) => s.parse().map_err(|_| {
                CoreError::validation(
                    "mode",
                    format!("expected static|colour_id|rainbow, got \"{s}\""),
                )
            })?,
            Some(other) => {
                return Err(CoreError::validation(
                    "mode",
                    format!("expected a string, got {other}"),
                ));
            }
        };

        Ok(Self {
            mode,
            red: number_option(options, "red", (0, 255), 0)?,
            green: number_option(options, "green", (0, 255), 0)?,
            blue: number_option(options, "blue", (0, 255), 0)?,
        })
    }

    pub fn settings(&self) -> LedStripSettings {
        LedStripSettings {
            mode: self.mode,
            red: self.red,
            green: self.green,
            blue: self.blue,
        }
    }
}

// ── Option helpers ───────────────────────────────────────────────────

/// A present, non-null option value.
fn field<'a>(options: &'a Value, name: &str) -> Option<&'a Value> {
    options.get(name).filter(|v| !v.is_null())
}

fn text_option(options: &Value, name: &str) -> Result<String, CoreError> {
    match field(options, name) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(CoreError::validation(
            name,
            format!("expected text, got {other}"),
        )),
    }
}

/// Integer option within `range` (inclusive). Numeric strings are accepted.
fn number_option(
    options: &Value,
    name: &str,
    range: (u8, u8),
    default: u8,
) -> Result<u8, CoreError> {
    let raw = match field(options, name) {
        None => return Ok(default),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            CoreError::validation(name, format!("expected a whole number, got {n}"))
        })?,
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| {
            CoreError::validation(name, format!("expected a whole number, got \"{s}\""))
        })?,
        Some(other) => {
            return Err(CoreError::validation(
                name,
                format!("expected a number, got {other}"),
            ));
        }
    };
    check_range(name, raw, range)
}

fn check_range(name: &str, value: u64, (min, max): (u8, u8)) -> Result<u8, CoreError> {
    if value < u64::from(min) || value > u64::from(max) {
        return Err(CoreError::validation(
            name,
            format!("{value} is outside {min}-{max}"),
        ));
    }
    u8::try_from(value).map_err(|_| CoreError::validation(name, format!("{value} is too large")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn notification_defaults() {
        let request = NotificationRequest::from_options(&json!({})).unwrap();
        assert_eq!(request, NotificationRequest::default());
        assert_eq!(request.duration, 10);
    }

    #[test]
    fn notification_reads_numbers_and_numeric_strings() {
        let request = NotificationRequest::from_options(&json!({
            "title": "T",
            "message": "M",
            "priority": "1",
            "duration": 30
        }))
        .unwrap();
        assert_eq!(request.priority, 1);
        assert_eq!(request.duration, 30);
        assert_eq!(request.notification().title, "T");
        assert_eq!(request.timing().time, 30);
    }

    #[test]
    fn notification_rejects_out_of_range() {
        for options in [
            json!({"priority": 3}),
            json!({"duration": 4}),
            json!({"duration": 31}),
            json!({"priority": -1}),
            json!({"priority": 1.5}),
        ] {
            let err = NotificationRequest::from_options(&options).unwrap_err();
            assert!(matches!(err, CoreError::Validation { .. }), "{options}");
        }
    }

    #[test]
    fn led_strip_parses_mode_and_channels() {
        let request = LedStripRequest::from_options(&json!({
            "mode": "colour_id",
            "red": 255,
            "green": 0,
            "blue": 128
        }))
        .unwrap();
        assert_eq!(request.mode, LedMode::ColourId);
        assert_eq!(request.blue, 128);
    }

    #[test]
    fn led_strip_rejects_bad_values() {
        assert!(LedStripRequest::from_options(&json!({"red": 256})).is_err());
        assert!(LedStripRequest::from_options(&json!({"mode": "strobe"})).is_err());
        assert!(LedStripRequest::from_options(&json!({"green": true})).is_err());
    }

    #[test]
    fn validate_checks_built_requests() {
        let request = NotificationRequest {
            duration: 2,
            ..NotificationRequest::default()
        };
        assert!(request.validate().is_err());
        assert!(NotificationRequest::default().validate().is_ok());
    }
}
