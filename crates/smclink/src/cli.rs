//! Clap derive structures for the `smclink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smclink -- poll and control a System Management Controller
#[derive(Debug, Parser)]
#[command(
    name = "smclink",
    version,
    about = "Poll and control System Management Controllers from the command line",
    long_about = "Reads power, identity, session and LED strip state from an SMC over its\n\
        local REST API, and sends power, LCD and LED strip commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "SMCLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// SMC address, IP or host:port (overrides profile)
    #[arg(long, short = 'a', env = "SMCLINK_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Username for command requests (overrides profile)
    #[arg(long, short = 'u', env = "SMCLINK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for command requests (overrides profile)
    #[arg(long, env = "SMCLINK_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SMCLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// GET timeout in milliseconds (overrides profile)
    #[arg(long, env = "SMCLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the device once and show every variable
    #[command(alias = "st")]
    Status,

    /// Keep polling and print changes as they happen
    Watch(WatchArgs),

    /// Chassis power control
    Power(PowerArgs),

    /// Flash the front-panel LCD to identify the machine
    #[command(alias = "flash-lcd")]
    Whoami,

    /// Show a notification on the front-panel LCD
    Notify(NotifyArgs),

    /// Set the LED strip mode and colour
    #[command(alias = "set-strip")]
    Led(LedArgs),

    /// Evaluate a feedback against freshly polled state
    #[command(alias = "fb")]
    Feedback(FeedbackArgs),

    /// List the actions a host can trigger
    Actions,

    /// List the feedbacks a host can evaluate
    Feedbacks,

    /// List the variables published from device state
    #[command(alias = "vars")]
    Variables,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(long)]
    pub duration: Option<u64>,
}

// ── Power ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PowerArgs {
    #[command(subcommand)]
    pub command: PowerCommand,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum PowerCommand {
    /// Power the system on
    On,
    /// Power the system off (does not gracefully shut down the OS)
    Off,
    /// Power cycle the system
    Cycle,
}

// ── Notify ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Notification title
    #[arg(long, short = 't', default_value = "")]
    pub title: String,

    /// Notification message
    #[arg(long, short = 'm', default_value = "")]
    pub message: String,

    /// Priority (0-2)
    #[arg(long, default_value = "0")]
    pub priority: u8,

    /// Seconds on screen (5-30)
    #[arg(long, short = 'd', default_value = "10")]
    pub duration: u8,
}

// ── LED strip ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LedArgs {
    /// Strip mode
    #[arg(long, default_value = "static")]
    pub mode: LedModeArg,

    /// Red channel (0-255)
    #[arg(long, short = 'r', default_value = "0")]
    pub red: u8,

    /// Green channel (0-255)
    #[arg(long, short = 'g', default_value = "0")]
    pub green: u8,

    /// Blue channel (0-255)
    #[arg(long, short = 'b', default_value = "0")]
    pub blue: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LedModeArg {
    Static,
    ColourId,
    Rainbow,
}

impl LedModeArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::ColourId => "colour_id",
            Self::Rainbow => "rainbow",
        }
    }
}

// ── Feedback ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    #[command(subcommand)]
    pub command: FeedbackCommand,

    /// Exit with status 1 when the feedback is false
    #[arg(long, global = true)]
    pub exit_status: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum FeedbackCommand {
    /// True when system power matches STATE
    Power {
        #[arg(default_value = "on")]
        state: PowerStateArg,
    },
    /// True when the aggregate power fault matches STATE
    PowerFault {
        #[arg(default_value = "true")]
        state: FaultStateArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerStateArg {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FaultStateArg {
    True,
    False,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration (passwords masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Add or replace a device profile
    AddProfile {
        /// Profile name
        name: String,

        /// SMC address, IP or host:port
        #[arg(long)]
        address: String,

        /// Username for command requests
        #[arg(long)]
        username: Option<String>,

        /// Environment variable holding the password
        #[arg(long)]
        password_env: Option<String>,

        /// Poll interval in milliseconds
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Also make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
