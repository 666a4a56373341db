//! Feedback command: poll once and evaluate one predicate.

use serde::Serialize;
use serde_json::json;

use smclink_core::{ControllerConfig, FeedbackKind};

use crate::cli::{FaultStateArg, FeedbackArgs, FeedbackCommand, GlobalOpts, PowerStateArg};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct FeedbackView {
    feedback: FeedbackKind,
    state: &'static str,
    result: bool,
}

fn request(cmd: FeedbackCommand) -> (FeedbackKind, &'static str) {
    match cmd {
        FeedbackCommand::Power { state } => (
            FeedbackKind::Power,
            match state {
                PowerStateArg::On => "on",
                PowerStateArg::Off => "off",
            },
        ),
        FeedbackCommand::PowerFault { state } => (
            FeedbackKind::PowerFault,
            match state {
                FaultStateArg::True => "true",
                FaultStateArg::False => "false",
            },
        ),
    }
}

pub async fn handle(
    config: ControllerConfig,
    args: FeedbackArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (kind, state) = request(args.command);
    let name = kind.to_string();
    let options = json!({ "state": state });

    let result = super::poll_once(config, |controller| {
        controller.evaluate_feedback(&name, &options)
    })
    .await?;

    let view = FeedbackView {
        feedback: kind,
        state,
        result,
    };
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |v| {
            format!(
                "{} (state={}): {}",
                v.feedback.name(),
                v.state,
                output::flag_label(v.result, true, color)
            )
        },
        |v| v.result.to_string(),
    );
    output::print_output(&out, global.quiet);

    if args.exit_status && !result {
        return Err(CliError::FeedbackFalse { name });
    }
    Ok(())
}
