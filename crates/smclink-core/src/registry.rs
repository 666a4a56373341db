// ── Action / feedback / variable registry ──
//
// The single canonical table of what a host can trigger, test and display.
// Identifiers are the stable strings hosts store in their button configs.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

// ── Variables ───────────────────────────────────────────────────────

/// A host-visible variable backed by a [`DeviceState`](crate::DeviceState) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Variable {
    Serial,
    Hostname,
    #[strum(serialize = "type")]
    #[serde(rename = "type")]
    MachineType,
    Role,
    SystemPower,
    PowerOverload,
    MainPowerFault,
    PowerControlFault,
    StripMode,
    StripRed,
    StripGreen,
    StripBlue,
}

impl Variable {
    pub fn name(self) -> &'static str {
        match self {
            Self::Serial => "Machine Serial",
            Self::Hostname => "Machine Name",
            Self::MachineType => "Machine Type",
            Self::Role => "Machine Role",
            Self::SystemPower => "System Power",
            Self::PowerOverload => "Power Overload",
            Self::MainPowerFault => "Main Power Fault",
            Self::PowerControlFault => "Power Control Fault",
            Self::StripMode => "LED Strip Mode",
            Self::StripRed => "LED Strip Red",
            Self::StripGreen => "LED Strip Green",
            Self::StripBlue => "LED Strip Blue",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

// ── Feedbacks ───────────────────────────────────────────────────────

/// Boolean feedback a host can attach to a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeedbackKind {
    Power,
    PowerFault,
}

impl FeedbackKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Power => "Check System Power",
            Self::PowerFault => "Check Any Power Fault",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Power => "Checks if the system is powered on (or off).",
            Self::PowerFault => "Checks the machine for any power fault.",
        }
    }

    pub fn options(self) -> &'static [OptionSpec] {
        match self {
            Self::Power => &[OptionSpec {
                id: "state",
                label: "State",
                kind: OptionKind::Dropdown {
                    choices: &["on", "off"],
                    default: "on",
                },
            }],
            Self::PowerFault => &[OptionSpec {
                id: "state",
                label: "State",
                kind: OptionKind::Dropdown {
                    choices: &["true", "false"],
                    default: "true",
                },
            }],
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

// ── Actions ─────────────────────────────────────────────────────────

/// A command a host can trigger. Older identifiers are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[strum(to_string = "power_on")]
    PowerOn,
    #[strum(to_string = "power_off")]
    PowerOff,
    #[strum(to_string = "power_cycle")]
    PowerCycle,
    #[strum(to_string = "flash_lcd", serialize = "who_am_i")]
    FlashLcd,
    #[strum(to_string = "send_notification", serialize = "notification")]
    SendNotification,
    #[strum(to_string = "set_led_strip", serialize = "set_strip")]
    SetLedStrip,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::PowerOn => "Power On",
            Self::PowerOff => "Power Off",
            Self::PowerCycle => "Power Cycle",
            Self::FlashLcd => "Flash LCD",
            Self::SendNotification => "Send a Notification to the LCD",
            Self::SetLedStrip => "Set LED Strip",
        }
    }

    /// Operator-facing caveat shown next to the action, if any.
    pub fn note(self) -> Option<&'static str> {
        match self {
            Self::PowerOff => Some("This will not gracefully shut down the OS"),
            _ => None,
        }
    }

    pub fn options(self) -> &'static [OptionSpec] {
        match self {
            Self::PowerOn | Self::PowerOff | Self::PowerCycle | Self::FlashLcd => &[],
            Self::SendNotification => &[
                OptionSpec {
                    id: "title",
                    label: "Title",
                    kind: OptionKind::Text { default: "" },
                },
                OptionSpec {
                    id: "message",
                    label: "Message",
                    kind: OptionKind::Text { default: "" },
                },
                OptionSpec {
                    id: "priority",
                    label: "Priority",
                    kind: OptionKind::Number {
                        min: 0,
                        max: 2,
                        default: 0,
                    },
                },
                OptionSpec {
                    id: "duration",
                    label: "Duration",
                    kind: OptionKind::Number {
                        min: 5,
                        max: 30,
                        default: 10,
                    },
                },
            ],
            Self::SetLedStrip => &[
                OptionSpec {
                    id: "mode",
                    label: "Select Mode",
                    kind: OptionKind::Dropdown {
                        choices: &["static", "colour_id", "rainbow"],
                        default: "static",
                    },
                },
                OptionSpec {
                    id: "red",
                    label: "Red",
                    kind: OptionKind::Number {
                        min: 0,
                        max: 255,
                        default: 0,
                    },
                },
                OptionSpec {
                    id: "green",
                    label: "Green",
                    kind: OptionKind::Number {
                        min: 0,
                        max: 255,
                        default: 0,
                    },
                },
                OptionSpec {
                    id: "blue",
                    label: "Blue",
                    kind: OptionKind::Number {
                        min: 0,
                        max: 255,
                        default: 0,
                    },
                },
            ],
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

// ── Option descriptors ──────────────────────────────────────────────

/// One configurable option of an action or feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: OptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    Text {
        default: &'static str,
    },
    Number {
        min: u8,
        max: u8,
        default: u8,
    },
    Dropdown {
        choices: &'static [&'static str],
        default: &'static str,
    },
}

impl OptionSpec {
    /// Human-readable summary of the accepted values.
    pub fn describe(&self) -> String {
        match self.kind {
            OptionKind::Text { default } if default.is_empty() => "text".into(),
            OptionKind::Text { default } => format!("text (default \"{default}\")"),
            OptionKind::Number { min, max, default } => {
                format!("{min}-{max} (default {default})")
            }
            OptionKind::Dropdown { choices, default } => {
                format!("{} (default {default})", choices.join("|"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_aliases_parse() {
        assert_eq!("who_am_i".parse::<ActionKind>().ok(), Some(ActionKind::FlashLcd));
        assert_eq!("flash_lcd".parse::<ActionKind>().ok(), Some(ActionKind::FlashLcd));
        assert_eq!(
            "notification".parse::<ActionKind>().ok(),
            Some(ActionKind::SendNotification)
        );
        assert_eq!("set_strip".parse::<ActionKind>().ok(), Some(ActionKind::SetLedStrip));
        assert!("reboot".parse::<ActionKind>().is_err());
    }

    #[test]
    fn action_ids_display_canonical_names() {
        assert_eq!(ActionKind::FlashLcd.to_string(), "flash_lcd");
        assert_eq!(ActionKind::SendNotification.to_string(), "send_notification");
        assert_eq!(ActionKind::all().count(), 6);
    }

    #[test]
    fn variable_ids() {
        assert_eq!(Variable::MachineType.to_string(), "type");
        assert_eq!(Variable::StripRed.to_string(), "strip_red");
        assert_eq!("power_overload".parse::<Variable>().ok(), Some(Variable::PowerOverload));
        assert_eq!(Variable::all().count(), 12);
    }

    #[test]
    fn feedback_ids() {
        assert_eq!(FeedbackKind::PowerFault.to_string(), "power_fault");
        assert_eq!("power".parse::<FeedbackKind>().ok(), Some(FeedbackKind::Power));
    }

    #[test]
    fn option_descriptions() {
        let options = ActionKind::SendNotification.options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[3].describe(), "5-30 (default 10)");
        assert_eq!(
            ActionKind::SetLedStrip.options()[0].describe(),
            "static|colour_id|rainbow (default static)"
        );
    }
}
