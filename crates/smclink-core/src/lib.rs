//! Polling controller between `smclink-api` and hosts (CLI, automation
//! platforms).
//!
//! - **[`Controller`]**: lifecycle facade. [`init()`](Controller::init)
//!   starts the command processor and the 1 s poller,
//!   [`config_updated()`](Controller::config_updated) swaps configuration
//!   and restarts polling, [`destroy()`](Controller::destroy) stops both.
//!   [`Controller::oneshot()`](Controller::oneshot) runs a single closure
//!   without a poll timer.
//!
//! - **[`StateStore`]**: latest [`DeviceState`], connection health with its
//!   log latch, and the request epoch. Any completion whose epoch is older
//!   than the last accepted one is dropped.
//!
//! - **[`Command`]**: typed write requests, built from host option bags via
//!   [`Command::from_options`] and routed through an `mpsc` channel.
//!
//! - **[`Feedback`]**: boolean predicates over the current `DeviceState`.
//!
//! - **[`registry`]**: identifiers and option descriptors for every action,
//!   feedback and variable.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod feedback;
pub mod model;
pub mod registry;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{
    Command, CommandResult, LedStripRequest, NotificationRequest, PlannedRequest, RequestOutcome,
};
pub use config::ControllerConfig;
pub use controller::{Controller, PollReport, PollerState};
pub use error::CoreError;
pub use event::{ControllerEvent, VariableUpdate};
pub use feedback::{Feedback, PowerState};
pub use model::{ConnectionHealth, DeviceState, HealthSnapshot, VariableValue};
pub use registry::{ActionKind, FeedbackKind, OptionKind, OptionSpec, Variable};
pub use store::{Completion, Epoch, StateStore};

// Wire types hosts need when building commands in code.
pub use smclink_api::models::LedMode;
