//! Version command implementation.

use crate::api::FlowServer;
use crate::cli::context::Context;
use crate::error::Result;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<ServerVersion>,
}

#[derive(Serialize)]
struct ServerVersion {
    profile: String,
    version: Option<String>,
}

/// Print the client version, plus the server's when a profile resolves.
///
/// An unreachable server is reported as an unknown version, not an error.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: Option<&Context>, json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let server = ctx.and_then(server_version);

    if json {
        let output = VersionOutput {
            version,
            build,
            server,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("flowsync version {version} ({build})");
    if let Some(server) = server {
        println!(
            "server ({}) version {}",
            server.profile,
            server.version.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn server_version(ctx: &Context) -> Option<ServerVersion> {
    let connection = ctx.connection().ok()?;
    let version = ctx
        .server()
        .and_then(|s| s.server_version())
        .inspect_err(|e| debug!(error = %e, "server version unavailable"))
        .ok()
        .flatten();
    Some(ServerVersion {
        profile: connection.name,
        version,
    })
}
