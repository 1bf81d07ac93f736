//! Settings command implementation.

use crate::api::FlowServer;
use crate::cli::SettingsCommands;
use crate::cli::context::Context;
use crate::error::Result;
use serde_json::Value;

/// Execute a settings command.
///
/// The configuration is printed as JSON in both output modes; its shape is
/// whatever the server reports.
pub fn execute(command: &SettingsCommands, ctx: &Context) -> Result<()> {
    match command {
        SettingsCommands::Get => {
            let config = fetch(&ctx.server()?)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn fetch(server: &dyn FlowServer) -> Result<Value> {
    let config = server.server_config()?;
    tracing::debug!(
        keys = config.as_object().map_or(0, serde_json::Map::len),
        "server configuration"
    );
    Ok(config)
}
