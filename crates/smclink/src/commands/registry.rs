//! Registry listings: actions, feedbacks and variables. No device needed.

use serde::Serialize;
use tabled::Tabled;

use smclink_core::{ActionKind, FeedbackKind, OptionSpec, Variable};

use crate::cli::GlobalOpts;
use crate::output;

// ── View models ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ActionView {
    id: ActionKind,
    name: &'static str,
    note: Option<&'static str>,
    options: &'static [OptionSpec],
}

#[derive(Debug, Serialize)]
struct FeedbackView {
    id: FeedbackKind,
    name: &'static str,
    description: &'static str,
    options: &'static [OptionSpec],
}

#[derive(Debug, Serialize)]
struct VariableView {
    id: Variable,
    name: &'static str,
}

#[derive(Tabled)]
struct RegistryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
}

fn describe_options(options: &[OptionSpec], note: Option<&str>) -> String {
    let mut lines: Vec<String> = options
        .iter()
        .map(|o| format!("{}: {}", o.id, o.describe()))
        .collect();
    if let Some(note) = note {
        lines.push(format!("note: {note}"));
    }
    if lines.is_empty() {
        return "-".into();
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn actions(global: &GlobalOpts) {
    let data: Vec<ActionView> = ActionKind::all()
        .map(|a| ActionView {
            id: a,
            name: a.name(),
            note: a.note(),
            options: a.options(),
        })
        .collect();
    let out = output::render_list(
        global.output,
        &data,
        |a| RegistryRow {
            id: a.id.to_string(),
            name: a.name,
            options: describe_options(a.options, a.note),
        },
        |a| a.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub fn feedbacks(global: &GlobalOpts) {
    let data: Vec<FeedbackView> = FeedbackKind::all()
        .map(|f| FeedbackView {
            id: f,
            name: f.name(),
            description: f.description(),
            options: f.options(),
        })
        .collect();
    let out = output::render_list(
        global.output,
        &data,
        |f| RegistryRow {
            id: f.id.to_string(),
            name: f.name,
            options: describe_options(f.options, None),
        },
        |f| f.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub fn variables(global: &GlobalOpts) {
    let data: Vec<VariableView> = Variable::all()
        .map(|v| VariableView {
            id: v,
            name: v.name(),
        })
        .collect();
    let out = output::render_list(
        global.output,
        &data,
        |v| VariableRow {
            id: v.id.to_string(),
            name: v.name,
        },
        |v| v.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}
