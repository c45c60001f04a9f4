//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders the hierarchy and command lists in the format selected by
//! `--output`. Table uses `tabled`, structured formats use serde, plain
//! emits one tab-separated line per entry.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use mpxedit_core::{Command, Plan, VirtualHierarchy};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Success line for stderr, e.g. `✓ 3 commands dispatched`.
pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✓".green())
    } else {
        format!("✓ {message}")
    }
}

pub fn notice(message: &str, color: bool) -> String {
    if color {
        message.yellow().to_string()
    } else {
        message.to_owned()
    }
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HierarchyRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Command")]
    command: String,
}

fn hierarchy_rows(hierarchy: &VirtualHierarchy) -> Vec<HierarchyRow> {
    let mut rows = Vec::new();
    for group in hierarchy.groups() {
        let label = match group.group.as_pending() {
            Some(pending) => format!("{} [{pending}]", group.label()),
            None => group.label(),
        };
        if group.devices.is_empty() {
            rows.push(HierarchyRow {
                group: label,
                id: String::new(),
                device: "-".into(),
                status: String::new(),
            });
            continue;
        }
        for device in &group.devices {
            rows.push(HierarchyRow {
                group: label.clone(),
                id: device.id.to_string(),
                device: device.name.clone(),
                status: device.status.suffix().unwrap_or_default().to_owned(),
            });
        }
    }
    rows
}

fn hierarchy_plain(hierarchy: &VirtualHierarchy) -> String {
    hierarchy
        .groups()
        .iter()
        .flat_map(|group| {
            group
                .devices
                .iter()
                .map(move |device| format!("{}\t{}\t{}", group.group, device.id, device.name))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn commands_table(commands: &[Command]) -> String {
    if commands.is_empty() {
        return "No pending changes".into();
    }
    let rows: Vec<CommandRow> = commands
        .iter()
        .enumerate()
        .map(|(idx, command)| CommandRow {
            step: idx + 1,
            command: format!("xinput {command}"),
        })
        .collect();
    render_table(&rows)
}

fn commands_plain(commands: &[Command]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Render dispatchers ───────────────────────────────────────────────

pub fn render_hierarchy(
    format: OutputFormat,
    hierarchy: &VirtualHierarchy,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(&hierarchy_rows(hierarchy))),
        OutputFormat::Plain => Ok(hierarchy_plain(hierarchy)),
        _ => render_structured(format, hierarchy),
    }
}

pub fn render_commands(format: OutputFormat, commands: &[Command]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(commands_table(commands)),
        OutputFormat::Plain => Ok(commands_plain(commands)),
        _ => render_structured(format, commands),
    }
}

/// Hierarchy and command list together. Plain output is the command
/// list alone so it can be piped.
pub fn render_plan(format: OutputFormat, plan: &Plan) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(format!(
            "{}\n\n{}",
            render_table(&hierarchy_rows(&plan.hierarchy)),
            commands_table(&plan.commands)
        )),
        OutputFormat::Plain => Ok(commands_plain(&plan.commands)),
        _ => render_structured(format, plan),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}
