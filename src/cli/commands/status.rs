//! Status command implementation.

use crate::cli::context::Context;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    profile: Option<String>,
    url: Option<String>,
    api_key: Option<String>,
    remote: Option<String>,
    remote_url: Option<String>,
    branch: Option<String>,
    config_dir: String,
}

/// Show the active profile, remote and branch.
///
/// Never fails on missing selections; they are reported as absent.
pub fn execute(ctx: &Context) -> Result<()> {
    let connection = ctx.connection().ok();
    let selection = connection
        .as_ref()
        .map(|c| ctx.registry.current(&c.name))
        .unwrap_or_default();
    let remote_url = selection
        .remote
        .as_deref()
        .and_then(|r| ctx.registry.get_remote(r).ok())
        .map(|r| r.url);

    let output = StatusOutput {
        profile: connection.as_ref().map(|c| c.name.clone()),
        url: connection.as_ref().map(|c| c.url.clone()),
        api_key: connection
            .as_ref()
            .filter(|c| !c.api_key.is_empty())
            .map(|c| mask_api_key(&c.api_key)),
        remote: selection.remote,
        remote_url,
        branch: selection.branch,
        config_dir: ctx.registry.dir().display().to_string(),
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let na = || "N/A".dimmed().to_string();
    println!("{}", "Current Status".bold().underline());
    println!();
    println!("{}", "Environment:".blue().bold());
    println!("  Profile: {}", output.profile.clone().unwrap_or_else(na));
    println!("  URL:     {}", output.url.clone().unwrap_or_else(na));
    if let Some(key) = &output.api_key {
        println!("  API Key: {key}");
    }
    println!();
    println!("{}", "Git:".blue().bold());
    println!("  Remote:  {}", output.remote.clone().unwrap_or_else(na));
    if let Some(url) = &output.remote_url {
        println!("  URL:     {url}");
    }
    println!("  Branch:  {}", output.branch.clone().unwrap_or_else(na));

    if output.profile.is_none() {
        println!();
        println!(
            "{}",
            "No default profile set. Register one with 'flowsync env register'.".yellow()
        );
    }
    Ok(())
}

/// Show the first four characters of a secret and star the rest.
pub(super) fn mask_api_key(key: &str) -> String {
    const VISIBLE: usize = 4;
    let len = key.chars().count();
    if len <= VISIBLE {
        return "*".repeat(len);
    }
    let head: String = key.chars().take(VISIBLE).collect();
    format!("{head}{}", "*".repeat(len - VISIBLE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("sk-abcdef"), "sk-a*****");
        assert_eq!(mask_api_key("abc"), "***");
        assert_eq!(mask_api_key(""), "");
    }
}
