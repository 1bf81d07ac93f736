//! Flow commands: server views plus create, update and delete.

use std::path::Path;

use crate::api::{FlowServer, project_id_by_name};
use crate::cli::FlowsCommands;
use crate::cli::context::Context;
use crate::cli::prompt::{TerminalConfirm, require};
use crate::error::{Error, Result};
use crate::model::{Flow, FlowDraft, FlowUpdate};
use crate::sync::{Confirm, ItemKind, Prompt};
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};

use super::json_object;

#[derive(Serialize)]
struct FlowSummary<'a> {
    id: &'a str,
    name: &'a str,
    project_id: Option<&'a str>,
    last_tested_version: Option<&'a str>,
}

impl<'a> From<&'a Flow> for FlowSummary<'a> {
    fn from(f: &'a Flow) -> Self {
        Self {
            id: &f.id,
            name: &f.name,
            project_id: f.project_id.as_deref(),
            last_tested_version: f.last_tested_version.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct FlowListOutput<'a> {
    flows: Vec<FlowSummary<'a>>,
    count: usize,
}

/// Execute a flows command.
pub fn execute(command: &FlowsCommands, ctx: &Context) -> Result<()> {
    let server = ctx.server()?;
    match command {
        FlowsCommands::List {
            project_id,
            project_name,
        } => {
            let project = match (project_id, project_name) {
                (Some(id), _) => Some(id.clone()),
                (None, Some(name)) => Some(project_id_by_name(&server, name)?),
                (None, None) => None,
            };
            execute_list(&server, project.as_deref(), ctx.json)
        }
        FlowsCommands::Get { id } => execute_get(&server, id, ctx.json),
        FlowsCommands::Create {
            name,
            data,
            file,
            project_id,
            project_name,
        } => {
            let fields = read_fields(data.as_deref(), file.as_deref())?;
            let flow = create_flow(
                &server,
                fields,
                name.as_deref(),
                project_id.as_deref(),
                project_name.as_deref(),
            )?;
            show_written(ctx, &flow, "created")
        }
        FlowsCommands::Update { id, data } => {
            let flow = update_flow(&server, id, json_object(data, "--data")?)?;
            show_written(ctx, &flow, "updated")
        }
        FlowsCommands::Delete { id, yes } => {
            delete_flow(&server, &TerminalConfirm, id, *yes)?;
            if ctx.json {
                let output = serde_json::json!({ "flow": id, "action": "deleted" });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                ctx.say(format!("{} Flow '{id}' deleted", "✓".green()));
            }
            Ok(())
        }
    }
}

fn execute_list(server: &dyn FlowServer, project_id: Option<&str>, json: bool) -> Result<()> {
    let flows = server.list_flows(project_id)?;

    if json {
        let output = FlowListOutput {
            count: flows.len(),
            flows: flows.iter().map(FlowSummary::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if flows.is_empty() {
        println!("No flows found.");
    } else {
        println!("Flows ({}):\n", flows.len());
        for flow in &flows {
            println!("  {}", flow.name);
            println!("    ID:      {}", flow.id);
            println!("    Project: {}", flow.project_id.as_deref().unwrap_or("-"));
            if let Some(version) = &flow.last_tested_version {
                println!("    Version: {version}");
            }
        }
    }
    Ok(())
}

fn execute_get(server: &dyn FlowServer, id: &str, json: bool) -> Result<()> {
    let flow = server
        .get_flow(id)?
        .ok_or_else(|| Error::FlowNotFound { id: id.to_string() })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&flow)?);
    } else {
        print_details(&flow);
        if let Some(description) = flow.data.get("description").and_then(|d| d.as_str()) {
            println!("  Description: {description}");
        }
    }
    Ok(())
}

fn print_details(flow: &Flow) {
    println!("Flow: {}", flow.name);
    println!("  ID:      {}", flow.id);
    println!("  Project: {}", flow.project_id.as_deref().unwrap_or("-"));
    println!(
        "  Version: {}",
        flow.last_tested_version.as_deref().unwrap_or("-")
    );
}

fn show_written(ctx: &Context, flow: &Flow, action: &str) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(flow)?);
    } else if !ctx.quiet {
        println!("{} Flow {action}", "✓".green());
        print_details(flow);
    }
    Ok(())
}

/// Fields for `flows create`: the file wins, then `--data`, else none.
fn read_fields(data: Option<&str>, file: Option<&Path>) -> Result<Map<String, Value>> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)?;
        return json_object(&text, &path.display().to_string());
    }
    data.map_or_else(|| Ok(Map::new()), |d| json_object(d, "--data"))
}

/// Create a flow, placing it in the named project when one is given.
///
/// The project is resolved from `--project-name`, then `--project-id`, then
/// a project field inside the data. Whatever resolves must exist.
fn create_flow(
    server: &dyn FlowServer,
    fields: Map<String, Value>,
    name: Option<&str>,
    project_id: Option<&str>,
    project_name: Option<&str>,
) -> Result<Flow> {
    let mut draft = FlowDraft::from_fields(fields, name).ok_or_else(|| {
        Error::InvalidArgument(
            "a flow name is required: pass --name or include \"name\" in the data".to_string(),
        )
    })?;

    draft.project_id = match project_name {
        Some(name) => Some(project_id_by_name(server, name)?),
        None => match project_id.map(str::to_string).or(draft.project_id.take()) {
            Some(id) => Some(existing_project(server, id)?),
            None => None,
        },
    };
    server.create_flow(&draft)
}

fn existing_project(server: &dyn FlowServer, id: String) -> Result<String> {
    if server.list_projects()?.iter().any(|p| p.id == id) {
        Ok(id)
    } else {
        Err(Error::ProjectNotFound { id })
    }
}

/// Apply `fields` to the stored flow and write it back.
fn update_flow(server: &dyn FlowServer, id: &str, fields: Map<String, Value>) -> Result<Flow> {
    let current = server
        .get_flow(id)?
        .ok_or_else(|| Error::FlowNotFound { id: id.to_string() })?;
    let patched = current.patched(fields);
    server.update_flow(&FlowUpdate::from_flow(&patched, patched.project_id.clone()))
}

fn delete_flow(server: &dyn FlowServer, confirm: &dyn Confirm, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let prompt = Prompt::Delete {
            kind: ItemKind::Flow,
            id: id.to_string(),
        };
        require(confirm, &prompt)?;
    }
    server.delete_flow(id)
}
