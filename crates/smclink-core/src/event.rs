// ── Host notifications ──
//
// Broadcast alongside the watch channels so hosts can react to discrete
// changes without diffing snapshots themselves.

use serde::Serialize;

use crate::model::{HealthSnapshot, VariableValue};
use crate::registry::{FeedbackKind, Variable};

/// One variable's new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableUpdate {
    pub variable: Variable,
    pub value: VariableValue,
}

/// Events emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// Connection status changed.
    HealthChanged(HealthSnapshot),
    /// A response group updated these variables.
    VariablesChanged(Vec<VariableUpdate>),
    /// Feedback inputs changed; the host should re-evaluate these.
    CheckFeedbacks(Vec<FeedbackKind>),
}
