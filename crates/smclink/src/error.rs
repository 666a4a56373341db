//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use smclink_config::ConfigError;
use smclink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the SMC at {address}: {reason}")]
    #[diagnostic(
        code(smclink::connection_failed),
        help(
            "Check that the machine is powered and the SMC is on the network.\n\
             Address: {address}"
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("Request to {address} timed out")]
    #[diagnostic(
        code(smclink::timeout),
        help("Increase the GET timeout with --timeout or check the SMC's responsiveness.")
    )]
    Timeout { address: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The SMC rejected the credentials (HTTP {status})")]
    #[diagnostic(
        code(smclink::auth_failed),
        help(
            "Commands need the SMC username and password.\n\
             Pass --username/--password, set SMCLINK_PASSWORD, or add them to the profile."
        )
    )]
    AuthFailed { status: u16 },

    // ── Device ───────────────────────────────────────────────────────
    #[error("SMC error: {message}")]
    #[diagnostic(code(smclink::device_error))]
    DeviceError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smclink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No SMC address configured")]
    #[diagnostic(
        code(smclink::no_address),
        help(
            "Pass --address <IP>, set SMCLINK_ADDRESS, or create a profile:\n  \
             smclink config add-profile <name> --address <IP> --default\n\
             Config file: {path}"
        )
    )]
    NoAddress { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(smclink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: smclink config add-profile {name} --address <IP>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(smclink::config))]
    Config(#[from] ConfigError),

    // ── Feedback ─────────────────────────────────────────────────────
    #[error("Feedback '{name}' is false")]
    #[diagnostic(code(smclink::feedback_false))]
    FeedbackFalse { name: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } | Self::Config(ConfigError::ProfileNotFound { .. }) => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. }
            | Self::NoAddress { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a core error, naming the address it concerned.
    pub fn from_core(err: CoreError, address: &str) -> Self {
        match err {
            CoreError::Configuration { message } => CliError::Validation {
                field: "address".into(),
                reason: message,
            },
            CoreError::Transport {
                timed_out: true, ..
            } => CliError::Timeout {
                address: address.into(),
            },
            CoreError::Transport { message, .. } => CliError::ConnectionFailed {
                address: address.into(),
                reason: message,
            },
            CoreError::Protocol {
                status: Some(status @ (401 | 403)),
                ..
            } => CliError::AuthFailed { status },
            CoreError::Protocol { message, .. } => CliError::DeviceError { message },
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::UnknownCommand { name } => CliError::Validation {
                field: "action".into(),
                reason: format!("unknown action '{name}'"),
            },
            CoreError::UnknownFeedback { name } => CliError::Validation {
                field: "feedback".into(),
                reason: format!("unknown feedback '{name}'"),
            },
            CoreError::ControllerNotRunning => CliError::DeviceError {
                message: "controller is not running".into(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::from_core(err, "(configured address)")
    }
}
