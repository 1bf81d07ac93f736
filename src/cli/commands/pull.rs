//! `flowsync git pull`: repository → server.

use crate::cli::PullArgs;
use crate::cli::context::Context;
use crate::cli::prompt::TerminalConfirm;
use crate::error::{Error, Result};
use crate::sync::{Puller, report};
use colored::Colorize;

use super::push::finish_single;

/// Pull one flow document or one project folder from the selected branch.
pub fn execute(args: &PullArgs, ctx: &Context) -> Result<()> {
    if let Some(flow_id) = &args.flow_id {
        return Err(Error::InvalidArgument(format!(
            "--flow-id {flow_id} is not supported for pull; pass the document path instead, \
             e.g. flowsync git pull projects/<Project>/<Flow>_{flow_id}.json"
        )));
    }

    let server = ctx.server()?;
    let target = ctx.target(
        args.location.remote.as_deref(),
        args.location.branch.as_deref(),
    )?;
    let confirm = TerminalConfirm;
    let puller = Puller::new(&server, &target.client, &target.branch, &confirm)
        .ignore_version_check(args.ignore_version_check);

    ctx.say(
        format!(
            "Pulling from {} ({})...",
            target.remote.name, target.branch
        )
        .cyan(),
    );

    if let Some(path) = &args.path {
        let pulled = puller.pull_path(
            path,
            args.project_id.as_deref(),
            args.project_name.as_deref(),
        )?;
        if let Some(project) = &pulled.resolution.provisioned {
            ctx.say(format!(
                "{} Created project '{}' ({})",
                "✓".green(),
                project.name,
                project.id
            ));
        }
        return finish_single(ctx, pulled.report);
    }

    let batch = puller.pull_project(args.project_id.as_deref(), args.project_name.as_deref())?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else if !ctx.quiet {
        report::print_batch("Pull", &batch);
    }
    Ok(())
}
