//! Profile management commands.
//!
//! - `flowsync env register <name> --url <url> --api-key <key>`
//! - `flowsync env list`
//! - `flowsync env current`
//! - `flowsync env select <name>`
//! - `flowsync env delete <name>`

use super::status::mask_api_key;
use crate::cli::EnvCommands;
use crate::cli::context::Context;
use crate::error::{Error, Result};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct ProfileOutput {
    name: String,
    url: String,
    default: bool,
}

#[derive(Serialize)]
struct CurrentOutput {
    profile: Option<String>,
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileOutput>,
    count: usize,
}

/// Execute an env command.
pub fn execute(command: &EnvCommands, ctx: &mut Context) -> Result<()> {
    match command {
        EnvCommands::Register { name, url, api_key } => execute_register(ctx, name, url, api_key),
        EnvCommands::List => execute_list(ctx),
        EnvCommands::Current => execute_current(ctx),
        EnvCommands::Select { name } => {
            ctx.registry.set_default_profile(name)?;
            report(ctx, "selected", name)
        }
        EnvCommands::Delete { name } => {
            ctx.registry.delete_profile(name)?;
            report(ctx, "deleted", name)
        }
    }
}

fn execute_register(ctx: &mut Context, name: &str, url: &str, api_key: &str) -> Result<()> {
    ctx.registry.save_profile(name, url, api_key)?;
    let profile = ctx.registry.get_profile(name)?;
    let default = ctx.registry.default_profile() == Some(name);

    if ctx.json {
        let output = ProfileOutput {
            name: profile.name,
            url: profile.url,
            default,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ctx.say(format!("{} Profile '{name}' registered", "✓".green()));
        ctx.say(format!("  URL: {}", profile.url).dimmed());
        if default {
            ctx.say("  Set as default profile".dimmed());
        }
    }
    Ok(())
}

fn execute_list(ctx: &Context) -> Result<()> {
    let default = ctx.registry.default_profile();
    let profiles: Vec<ProfileOutput> = ctx
        .registry
        .list_profiles()
        .into_iter()
        .map(|p| ProfileOutput {
            default: default == Some(p.name.as_str()),
            name: p.name,
            url: p.url,
        })
        .collect();

    if ctx.json {
        let output = ProfileListOutput {
            count: profiles.len(),
            profiles,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if profiles.is_empty() {
        println!("No profiles registered.");
        println!("\nRegister one with: flowsync env register <name> --url <url> --api-key <key>");
    } else {
        println!("Profiles ({}):\n", profiles.len());
        for p in &profiles {
            let marker = if p.default { "*".green() } else { " ".normal() };
            println!("{marker} {}", p.name.bold());
            println!("    URL: {}", p.url);
        }
    }
    Ok(())
}

/// The profile commands would use: `--profile`, else the default.
fn execute_current(ctx: &Context) -> Result<()> {
    let output = match ctx.connection() {
        Ok(c) => CurrentOutput {
            api_key: Some(mask_api_key(&c.api_key)),
            profile: Some(c.name),
            url: Some(c.url),
        },
        Err(Error::NoProfileSelected) => CurrentOutput {
            profile: None,
            url: None,
            api_key: None,
        },
        Err(e) => return Err(e),
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    match (&output.profile, &output.url) {
        (Some(name), Some(url)) => {
            println!("{} {}", "Current Profile:".bold(), name);
            println!("{} {url}", "URL:".bold());
            println!("{} {}", "API Key:".bold(), output.api_key.as_deref().unwrap_or("-"));
        }
        _ => println!(
            "{}",
            "No default profile set. Use 'flowsync env register' to create one.".yellow()
        ),
    }
    Ok(())
}

fn report(ctx: &Context, action: &str, name: &str) -> Result<()> {
    if ctx.json {
        let output = serde_json::json!({ "profile": name, "action": action });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ctx.say(format!("{} Profile '{name}' {action}", "✓".green()));
    }
    Ok(())
}
