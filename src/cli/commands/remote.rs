//! Remote management commands.

use crate::cli::RemoteCommands;
use crate::cli::context::Context;
use crate::error::{Error, Result};
use crate::remote::{GitHubClient, RemoteRepository};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct RemoteOutput {
    name: String,
    url: String,
    selected: bool,
}

/// Execute a remote command.
pub fn execute(command: &RemoteCommands, ctx: &mut Context) -> Result<()> {
    match command {
        RemoteCommands::Add { name, url, token } => {
            ctx.registry.add_remote(name, url, token)?;
            done(ctx, name, "added")?;
            ctx.say(format!("  URL: {url}").dimmed());
            Ok(())
        }
        RemoteCommands::List => execute_list(ctx),
        RemoteCommands::Remove { name } => {
            ctx.registry.remove_remote(name)?;
            done(ctx, name, "removed")
        }
        RemoteCommands::SetToken { name, token } => {
            ctx.registry.set_remote_token(name, token)?;
            done(ctx, name, "token updated")
        }
        RemoteCommands::Select { name, branch } => execute_select(ctx, name, branch.as_deref()),
    }
}

fn execute_list(ctx: &Context) -> Result<()> {
    let selected = ctx
        .profile_name()
        .ok()
        .and_then(|p| ctx.registry.current(&p).remote);
    let remotes: Vec<RemoteOutput> = ctx
        .registry
        .list_remotes()
        .into_iter()
        .map(|r| RemoteOutput {
            selected: selected.as_deref() == Some(r.name.as_str()),
            name: r.name,
            url: r.url,
        })
        .collect();

    if ctx.json {
        let output = serde_json::json!({ "remotes": remotes, "count": remotes.len() });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if remotes.is_empty() {
        println!("No remotes registered.");
        println!("\nAdd one with: flowsync git remote add <name> <url> --token <token>");
    } else {
        println!("Remotes ({}):\n", remotes.len());
        for r in &remotes {
            let marker = if r.selected { "*".green() } else { " ".normal() };
            println!("{marker} {}", r.name.bold());
            println!("    URL: {}", r.url);
        }
    }
    Ok(())
}

fn execute_select(ctx: &mut Context, name: &str, branch: Option<&str>) -> Result<()> {
    let profile = ctx.profile_name()?;
    let previous = ctx.registry.current(&profile);
    let remote = ctx.registry.get_remote(name)?;

    if let Some(branch) = branch {
        let client = GitHubClient::new(&remote.url, remote.token)?;
        ensure_branch(&client, branch)?;
    }

    ctx.registry.set_current_remote(&profile, name)?;
    if let Some(branch) = branch {
        ctx.registry.set_current_branch(&profile, branch)?;
    }
    let current = ctx.registry.current(&profile);

    if ctx.json {
        let output = serde_json::json!({
            "profile": profile,
            "remote": current.remote,
            "branch": current.branch,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    ctx.say(format!(
        "{} Remote '{name}' selected for profile '{profile}'",
        "✓".green()
    ));
    if let Some(branch) = branch {
        ctx.say(format!("{} Branch '{branch}' selected", "✓".green()));
    } else if let Some(old) = previous.branch.filter(|_| previous.remote.as_deref() != Some(name)) {
        ctx.say(
            format!("Note: branch '{old}' was reset. Use 'flowsync git checkout <branch>' to select one.")
                .yellow(),
        );
    }
    Ok(())
}

/// Fail with the list of branches unless `branch` exists on the remote.
pub(super) fn ensure_branch(repo: &dyn RemoteRepository, branch: &str) -> Result<()> {
    let available = repo.list_branches()?;
    if available.iter().any(|b| b == branch) {
        Ok(())
    } else {
        Err(Error::BranchNotFound {
            name: branch.to_string(),
            available,
        })
    }
}

fn done(ctx: &Context, name: &str, action: &str) -> Result<()> {
    if ctx.json {
        let output = serde_json::json!({ "remote": name, "action": action });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ctx.say(format!("{} Remote '{name}' {action}", "✓".green()));
    }
    Ok(())
}
