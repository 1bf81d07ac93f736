//! Project commands: server views plus create, update and delete.

use crate::api::FlowServer;
use crate::cli::ProjectsCommands;
use crate::cli::context::Context;
use crate::cli::prompt::{TerminalConfirm, require};
use crate::error::{Error, Result};
use crate::model::{Project, ProjectDraft};
use crate::sync::{Confirm, ItemKind, Prompt};
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};

use super::json_object;

#[derive(Serialize)]
struct ProjectListOutput<'a> {
    projects: &'a [Project],
    count: usize,
}

/// Execute a projects command.
pub fn execute(command: &ProjectsCommands, ctx: &Context) -> Result<()> {
    let server = ctx.server()?;
    match command {
        ProjectsCommands::List => execute_list(&server, ctx.json),
        ProjectsCommands::Get { id } => execute_get(&server, id, ctx.json),
        ProjectsCommands::Create { name, data } => {
            let fields = data
                .as_deref()
                .map_or_else(|| Ok(Map::new()), |d| json_object(d, "--data"))?;
            let project = server.create_project(&ProjectDraft::from_fields(name.as_str(), fields))?;
            show_written(ctx, &project, "created")
        }
        ProjectsCommands::Update { id, data } => {
            let project = update_project(&server, id, json_object(data, "--data")?)?;
            show_written(ctx, &project, "updated")
        }
        ProjectsCommands::Delete { id, yes } => {
            delete_project(&server, &TerminalConfirm, id, *yes)?;
            if ctx.json {
                let output = serde_json::json!({ "project": id, "action": "deleted" });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                ctx.say(format!("{} Project '{id}' deleted", "✓".green()));
            }
            Ok(())
        }
    }
}

fn execute_list(server: &dyn FlowServer, json: bool) -> Result<()> {
    let projects = server.list_projects()?;

    if json {
        let output = ProjectListOutput {
            projects: &projects,
            count: projects.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if projects.is_empty() {
        println!("No projects found.");
    } else {
        println!("Projects ({}):\n", projects.len());
        for project in &projects {
            println!("  {}", project.name);
            println!("    ID:   {}", project.id);
            if let Some(desc) = project.metadata.get("description").and_then(|d| d.as_str()) {
                println!("    Desc: {desc}");
            }
        }
    }
    Ok(())
}

fn execute_get(server: &dyn FlowServer, id: &str, json: bool) -> Result<()> {
    let project = server
        .get_project(id)?
        .ok_or_else(|| Error::ProjectNotFound { id: id.to_string() })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    let flows = server.list_flows(Some(&project.id))?;
    println!("Project: {}", project.name);
    println!("  ID:    {}", project.id);
    println!("  Flows: {}", flows.len());
    for flow in &flows {
        println!("    - {} ({})", flow.name, flow.id);
    }
    Ok(())
}

fn show_written(ctx: &Context, project: &Project, action: &str) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(project)?);
    } else {
        ctx.say(format!("{} Project '{}' {action}", "✓".green(), project.name));
        ctx.say(format!("  ID: {}", project.id).dimmed());
    }
    Ok(())
}

fn update_project(server: &dyn FlowServer, id: &str, fields: Map<String, Value>) -> Result<Project> {
    let current = server
        .get_project(id)?
        .ok_or_else(|| Error::ProjectNotFound { id: id.to_string() })?;
    server.update_project(id, &current.patched(fields))
}

fn delete_project(
    server: &dyn FlowServer,
    confirm: &dyn Confirm,
    id: &str,
    yes: bool,
) -> Result<()> {
    if !yes {
        let prompt = Prompt::Delete {
            kind: ItemKind::Project,
            id: id.to_string(),
        };
        require(confirm, &prompt)?;
    }
    server.delete_project(id)
}
