//! Command dispatch: bridges CLI args -> core Controller -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod feedback;
pub mod registry;
pub mod status;
pub mod watch;

use smclink_core::{Controller, ControllerConfig, CoreError};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Power(args) => control::power(config, args.command, global).await,
        Command::Whoami => control::whoami(config, global).await,
        Command::Notify(args) => control::notify(config, &args, global).await,
        Command::Led(args) => control::led(config, &args, global).await,
        Command::Feedback(args) => feedback::handle(config, args, global).await,
        // Handled before a device config is built
        Command::Actions
        | Command::Feedbacks
        | Command::Variables
        | Command::Config(_)
        | Command::Completions(_) => unreachable!(),
    }
}

/// Run one poll cycle without a timer, then read from the populated
/// controller. Fails when no endpoint answered at all.
pub(crate) async fn poll_once<T>(
    config: ControllerConfig,
    read: impl FnOnce(&Controller) -> Result<T, CoreError>,
) -> Result<T, CliError> {
    let address = config.target_address.clone();
    let (report, health, value) = Controller::oneshot(config, |controller| async move {
        let report = controller.refresh().await?;
        let value = read(&controller)?;
        Ok((report, controller.health(), value))
    })
    .await
    .map_err(|e| CliError::from_core(e, &address))?;

    tracing::debug!(
        epoch = report.epoch,
        accepted = report.accepted(),
        failed = report.failed(),
        "poll finished"
    );

    if report.accepted() == 0 {
        return Err(CliError::ConnectionFailed {
            address,
            reason: health
                .message
                .unwrap_or_else(|| "no endpoint answered".into()),
        });
    }
    Ok(value)
}
