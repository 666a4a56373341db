//! Status command: poll once and show every variable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use smclink_core::{ControllerConfig, DeviceState, HealthSnapshot, Variable, VariableValue};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── View model ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub address: String,
    pub health: HealthSnapshot,
    pub power_fault: Option<bool>,
    pub last_updated: Option<DateTime<Utc>>,
    pub variables: Vec<VariableEntry>,
}

#[derive(Debug, Serialize)]
pub struct VariableEntry {
    pub id: Variable,
    pub name: &'static str,
    pub value: VariableValue,
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Variable")]
    id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl StatusView {
    pub fn new(address: String, health: HealthSnapshot, device: &DeviceState) -> Self {
        let variables = device
            .variables()
            .into_iter()
            .map(|(id, value)| VariableEntry {
                id,
                name: id.name(),
                value,
            })
            .collect();

        Self {
            address,
            health,
            power_fault: device.power_fault,
            last_updated: device.last_updated,
            variables,
        }
    }
}

fn detail(view: &StatusView, color: bool) -> String {
    let mut lines = vec![
        format!("Address:     {}", view.address),
        format!(
            "Health:      {}",
            output::health_label(view.health.status, color)
        ),
    ];
    if let Some(ref message) = view.health.message {
        lines.push(format!("Message:     {message}"));
    }
    lines.push(format!(
        "Power fault: {}",
        view.power_fault
            .map_or_else(|| "-".into(), |f| output::flag_label(f, false, color))
    ));
    if let Some(at) = view.last_updated {
        lines.push(format!("Updated:     {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    let rows: Vec<VariableRow> = view
        .variables
        .iter()
        .map(|v| VariableRow {
            id: v.id.to_string(),
            name: v.name,
            value: v.value.to_string(),
        })
        .collect();
    lines.push(String::new());
    lines.push(output::render_table(&rows));
    lines.join("\n")
}

fn plain(view: &StatusView) -> String {
    view.variables
        .iter()
        .map(|v| format!("{}={}", v.id, v.value))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let address = config.target_address.clone();
    let (health, device) = super::poll_once(config, |controller| {
        Ok((controller.health(), controller.device()))
    })
    .await?;

    let view = StatusView::new(address, health, &device);
    let color = output::should_color(global.color);
    let out = output::render_single(global.output, &view, |v| detail(v, color), plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
