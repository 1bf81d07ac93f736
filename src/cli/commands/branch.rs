//! Branch commands: list, create, delete, checkout and switch.

use crate::cli::BranchCommands;
use crate::cli::context::Context;
use crate::error::{Error, Result};
use crate::remote::RemoteRepository;
use colored::Colorize;

use super::remote::ensure_branch;

/// Execute a branch command.
pub fn execute(command: &BranchCommands, ctx: &mut Context) -> Result<()> {
    match command {
        BranchCommands::List { remote } => execute_list(ctx, remote.as_deref()),
        BranchCommands::Create { name, from, remote } => {
            let (_, client) = ctx.remote(remote.as_deref())?;
            let source = create(&client, name, from.as_deref())?;
            report(ctx, name, "created", Some(&source))
        }
        BranchCommands::Delete { name, remote } => {
            let (_, client) = ctx.remote(remote.as_deref())?;
            client.delete_branch(name)?;
            report(ctx, name, "deleted", None)
        }
    }
}

fn execute_list(ctx: &Context, remote: Option<&str>) -> Result<()> {
    let (info, client) = ctx.remote(remote)?;
    let branches = client.list_branches()?;
    let current = ctx
        .profile_name()
        .ok()
        .map(|p| ctx.registry.current(&p))
        .filter(|s| s.remote.as_deref() == Some(info.name.as_str()))
        .and_then(|s| s.branch);

    if ctx.json {
        let output = serde_json::json!({
            "remote": info.name,
            "current": current,
            "branches": branches,
            "count": branches.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if branches.is_empty() {
        println!("No branches found on '{}'.", info.name);
    } else {
        println!("Branches on '{}' ({}):\n", info.name, branches.len());
        for b in &branches {
            if current.as_deref() == Some(b.as_str()) {
                println!("{} {}", "*".green(), b.green());
            } else {
                println!("  {b}");
            }
        }
    }
    Ok(())
}

/// Select an existing branch for the active profile.
pub fn execute_checkout(ctx: &mut Context, branch: &str, remote: Option<&str>) -> Result<()> {
    let (info, client) = ctx.remote(remote)?;
    ensure_branch(&client, branch)?;
    select(ctx, &info.name, remote.is_some(), branch)
}

/// Select a branch, creating it first when asked to.
pub fn execute_switch(
    ctx: &mut Context,
    branch: &str,
    create_missing: bool,
    from_branch: Option<&str>,
    remote: Option<&str>,
) -> Result<()> {
    let (info, client) = ctx.remote(remote)?;
    let available = client.list_branches()?;
    if !available.iter().any(|b| b == branch) {
        if !create_missing {
            return Err(Error::BranchNotFound {
                name: branch.to_string(),
                available,
            });
        }
        let source = create(&client, branch, from_branch)?;
        ctx.say(format!(
            "{} Branch '{branch}' created from '{source}'",
            "✓".green()
        ));
    }
    select(ctx, &info.name, remote.is_some(), branch)
}

/// Create `name` from `from` (or the default branch); returns the source.
fn create(repo: &dyn RemoteRepository, name: &str, from: Option<&str>) -> Result<String> {
    let source = match from {
        Some(source) => source.to_string(),
        None => repo.default_branch()?,
    };
    repo.create_branch(name, Some(&source))?;
    Ok(source)
}

fn select(ctx: &mut Context, remote: &str, explicit_remote: bool, branch: &str) -> Result<()> {
    let profile = ctx.profile_name()?;
    if explicit_remote {
        ctx.registry.set_current(&profile, Some(remote), Some(branch))?;
    } else {
        ctx.registry.set_current_branch(&profile, branch)?;
    }

    if ctx.json {
        let output = serde_json::json!({ "profile": profile, "remote": remote, "branch": branch });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ctx.say(format!("{} Switched to branch '{branch}'", "✓".green()));
    }
    Ok(())
}

fn report(ctx: &Context, name: &str, action: &str, source: Option<&str>) -> Result<()> {
    if ctx.json {
        let output = serde_json::json!({ "branch": name, "action": action, "source": source });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match source {
            Some(source) => ctx.say(format!("{} Branch '{name}' {action} from '{source}'", "✓".green())),
            None => ctx.say(format!("{} Branch '{name}' {action}", "✓".green())),
        }
    }
    Ok(())
}
