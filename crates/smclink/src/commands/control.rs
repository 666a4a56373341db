//! Command handlers that POST to the device: power, LCD, LED strip.

use serde_json::json;

use smclink_core::{Command as CoreCommand, Controller, ControllerConfig};

use crate::cli::{GlobalOpts, LedArgs, NotifyArgs, PowerCommand};
use crate::error::CliError;

/// Execute one command on a short-lived controller and surface the first
/// failed request as the error.
async fn run(
    config: ControllerConfig,
    cmd: CoreCommand,
    done: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let address = config.target_address.clone();
    let action = cmd.kind();
    tracing::debug!(%action, address = %address, "executing command");

    let result = Controller::oneshot(config, |controller| async move {
        controller.execute(cmd).await
    })
    .await
    .map_err(|e| CliError::from_core(e, &address))?;

    for outcome in &result.requests {
        match &outcome.result {
            Ok(_) => tracing::info!(path = outcome.path, "request accepted"),
            Err(e) => tracing::warn!(path = outcome.path, error = %e, "request failed"),
        }
    }

    if let Some(err) = result.first_error() {
        return Err(CliError::from_core(err.clone(), &address));
    }
    if !global.quiet {
        eprintln!("✓ {done}");
    }
    Ok(())
}

pub async fn power(
    config: ControllerConfig,
    cmd: PowerCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (cmd, done) = match cmd {
        PowerCommand::On => (CoreCommand::PowerOn, "Power on requested"),
        PowerCommand::Off => (CoreCommand::PowerOff, "Power off requested"),
        PowerCommand::Cycle => (CoreCommand::PowerCycle, "Power cycle requested"),
    };
    run(config, cmd, done, global).await
}

pub async fn whoami(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    run(config, CoreCommand::FlashLcd, "LCD flash requested", global).await
}

/// Options as a host would submit them for `send_notification`.
fn notify_options(args: &NotifyArgs) -> serde_json::Value {
    json!({
        "title": args.title,
        "message": args.message,
        "priority": args.priority,
        "duration": args.duration,
    })
}

/// Options as a host would submit them for `set_led_strip`.
fn led_options(args: &LedArgs) -> serde_json::Value {
    json!({
        "mode": args.mode.as_str(),
        "red": args.red,
        "green": args.green,
        "blue": args.blue,
    })
}

pub async fn notify(
    config: ControllerConfig,
    args: &NotifyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = CoreCommand::from_options("send_notification", &notify_options(args))?;
    run(config, cmd, "Notification sent", global).await
}

pub async fn led(
    config: ControllerConfig,
    args: &LedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = CoreCommand::from_options("set_led_strip", &led_options(args))?;
    run(config, cmd, "LED strip updated", global).await
}
