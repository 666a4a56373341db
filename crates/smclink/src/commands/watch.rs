//! Watch command: run the poller and print changes until stopped.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use smclink_core::{Controller, ControllerConfig, ControllerEvent, FeedbackKind};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Feedback options used when re-evaluating after a `CheckFeedbacks` event.
fn default_options(kind: FeedbackKind) -> serde_json::Value {
    let state = kind
        .options()
        .first()
        .map_or("", |opt| match opt.kind {
            smclink_core::OptionKind::Dropdown { default, .. }
            | smclink_core::OptionKind::Text { default } => default,
            smclink_core::OptionKind::Number { .. } => "",
        });
    serde_json::json!({ "state": state })
}

/// One event rendered as a line of output.
fn format_event(
    controller: &Controller,
    event: &ControllerEvent,
    format: OutputFormat,
    color: bool,
) -> Vec<String> {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            vec![serde_json::to_string(event).unwrap_or_default()]
        }
        OutputFormat::Yaml => vec![format!(
            "---\n{}",
            serde_yaml::to_string(event).unwrap_or_default().trim_end()
        )],
        OutputFormat::Table | OutputFormat::Plain => {
            let stamp = chrono::Local::now().format("%H:%M:%S");
            match event {
                ControllerEvent::HealthChanged(health) => {
                    let label = output::health_label(health.status, color);
                    let line = health.message.as_ref().map_or_else(
                        || format!("{stamp} health {label}"),
                        |m| format!("{stamp} health {label} ({m})"),
                    );
                    vec![line]
                }
                ControllerEvent::VariablesChanged(updates) => updates
                    .iter()
                    .map(|u| format!("{stamp} {} = {}", u.variable, u.value))
                    .collect(),
                ControllerEvent::CheckFeedbacks(kinds) => kinds
                    .iter()
                    .filter_map(|kind| {
                        let result = controller
                            .evaluate_feedback(&kind.to_string(), &default_options(*kind))
                            .ok()?;
                        Some(format!(
                            "{stamp} feedback {kind} {}",
                            output::flag_label(result, *kind == FeedbackKind::Power, color)
                        ))
                    })
                    .collect(),
            }
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    mut config: ControllerConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(interval) = args.interval {
        config.poll_interval = Duration::from_millis(interval);
    }
    if config.poll_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let color = output::should_color(global.color);
    let controller = Controller::new(config);
    let mut events = controller.events();
    controller.init().await;

    let deadline = args.duration.map(Duration::from_secs);
    let stop = async {
        match deadline {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = &mut stop => break,
            event = events.recv() => match event {
                Ok(event) => {
                    for line in format_event(&controller, &event, global.output, color) {
                        output::print_output(&line, global.quiet);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watch output fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    controller.destroy().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use smclink_core::{ConnectionHealth, HealthSnapshot, Variable, VariableUpdate, VariableValue};

    use super::*;

    #[test]
    fn feedback_defaults_come_from_registry() {
        assert_eq!(default_options(FeedbackKind::Power)["state"], "on");
        assert_eq!(default_options(FeedbackKind::PowerFault)["state"], "true");
    }

    #[test]
    fn variable_events_render_one_line_each() {
        let controller = Controller::new(ControllerConfig::default());
        let event = ControllerEvent::VariablesChanged(vec![
            VariableUpdate {
                variable: Variable::Hostname,
                value: VariableValue::Text("smc-01".into()),
            },
            VariableUpdate {
                variable: Variable::StripRed,
                value: VariableValue::Level(12),
            },
        ]);
        let lines = format_event(&controller, &event, OutputFormat::Plain, false);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("hostname = smc-01"));
        assert!(lines[1].ends_with("strip_red = 12"));
    }

    #[test]
    fn json_events_are_single_lines() {
        let controller = Controller::new(ControllerConfig::default());
        let event = ControllerEvent::HealthChanged(HealthSnapshot::new(
            ConnectionHealth::BadConfig,
            Some("IP is not set".into()),
        ));
        let lines = format_event(&controller, &event, OutputFormat::Json, false);
        assert_eq!(
            lines,
            vec![r#"{"event":"health_changed","data":{"status":"bad_config","message":"IP is not set"}}"#]
        );
    }
}
