use chrono::{DateTime, Utc};
use serde::Serialize;
use smclink_api::models::{LedStrip, LocalMachine, PowerStatus, Session};

use crate::registry::Variable;

/// Everything known about the device from the latest accepted responses.
///
/// Each response group replaces only its own fields. A group whose payload
/// fails to decode leaves the previous values in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceState {
    // ── /api/localmachine ──
    pub serial: Option<String>,
    pub hostname: Option<String>,
    pub machine_type: Option<String>,

    // ── /api/session ──
    pub role: Option<String>,

    // ── /api/chassis/power/status ──
    pub system_power: Option<bool>,
    pub power_overload: Option<bool>,
    pub main_power_fault: Option<bool>,
    pub power_control_fault: Option<bool>,
    /// OR of the three fault flags, recomputed on every power-status update.
    pub power_fault: Option<bool>,

    // ── /api/ledstrip ──
    pub led_mode: Option<String>,
    pub led_red: Option<u8>,
    pub led_green: Option<u8>,
    pub led_blue: Option<u8>,

    /// Wall-clock time of the last field update.
    pub last_updated: Option<DateTime<Utc>>,
}

/// A variable's current value as published to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Unknown,
    Text(String),
    Flag(bool),
    Level(u8),
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("-"),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Level(n) => write!(f, "{n}"),
        }
    }
}

fn text(v: Option<&String>) -> VariableValue {
    v.map_or(VariableValue::Unknown, |s| VariableValue::Text(s.clone()))
}

fn flag(v: Option<bool>) -> VariableValue {
    v.map_or(VariableValue::Unknown, VariableValue::Flag)
}

fn level(v: Option<u8>) -> VariableValue {
    v.map_or(VariableValue::Unknown, VariableValue::Level)
}

impl DeviceState {
    /// Current value of a host-visible variable.
    pub fn variable(&self, variable: Variable) -> VariableValue {
        match variable {
            Variable::Serial => text(self.serial.as_ref()),
            Variable::Hostname => text(self.hostname.as_ref()),
            Variable::MachineType => text(self.machine_type.as_ref()),
            Variable::Role => text(self.role.as_ref()),
            Variable::SystemPower => flag(self.system_power),
            Variable::PowerOverload => flag(self.power_overload),
            Variable::MainPowerFault => flag(self.main_power_fault),
            Variable::PowerControlFault => flag(self.power_control_fault),
            Variable::StripMode => text(self.led_mode.as_ref()),
            Variable::StripRed => level(self.led_red),
            Variable::StripGreen => level(self.led_green),
            Variable::StripBlue => level(self.led_blue),
        }
    }

    /// All variables with their current values, in registry order.
    pub fn variables(&self) -> Vec<(Variable, VariableValue)> {
        Variable::all().map(|v| (v, self.variable(v))).collect()
    }

    // ── Group updates ────────────────────────────────────────────────

    pub(crate) fn apply_local_machine(&mut self, machine: LocalMachine) -> Vec<Variable> {
        self.serial = Some(machine.serial);
        self.hostname = Some(machine.hostname);
        self.machine_type = Some(machine.machine_type);
        vec![Variable::Serial, Variable::Hostname, Variable::MachineType]
    }

    pub(crate) fn apply_session(&mut self, session: Session) -> Vec<Variable> {
        self.role = Some(session.role);
        vec![Variable::Role]
    }

    pub(crate) fn apply_power_status(&mut self, status: PowerStatus) -> Vec<Variable> {
        self.system_power = Some(status.system_power);
        self.power_overload = Some(status.power_overload);
        self.main_power_fault = Some(status.main_power_fault);
        self.power_control_fault = Some(status.power_control_fault);
        self.power_fault = Some(status.any_fault());
        vec![
            Variable::SystemPower,
            Variable::PowerOverload,
            Variable::MainPowerFault,
            Variable::PowerControlFault,
        ]
    }

    pub(crate) fn apply_led_strip(&mut self, strip: LedStrip) -> Vec<Variable> {
        self.led_mode = Some(strip.mode);
        self.led_red = Some(strip.red);
        self.led_green = Some(strip.green);
        self.led_blue = Some(strip.blue);
        vec![
            Variable::StripMode,
            Variable::StripRed,
            Variable::StripGreen,
            Variable::StripBlue,
        ]
    }
}
