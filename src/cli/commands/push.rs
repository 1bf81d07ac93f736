//! `flowsync git push`: server → repository.

use crate::api::project_id_by_name;
use crate::cli::PushArgs;
use crate::cli::context::Context;
use crate::error::{Error, Result};
use crate::sync::{ItemReport, Pusher, SyncOutcome, report};
use colored::Colorize;

/// Push one flow or one project to the selected branch.
pub fn execute(args: &PushArgs, ctx: &Context) -> Result<()> {
    let server = ctx.server()?;
    let target = ctx.target(
        args.location.remote.as_deref(),
        args.location.branch.as_deref(),
    )?;
    let pusher = Pusher::new(&server, &target.client, &target.branch)
        .with_message(args.message.as_deref());

    ctx.say(
        format!(
            "Pushing to {} ({})...",
            target.remote.name, target.branch
        )
        .cyan(),
    );

    if let Some(flow_id) = &args.flow_id {
        let item = pusher.push_flow_by_id(flow_id)?;
        return finish_single(ctx, item);
    }

    let project_id = match (&args.project_id, &args.project_name) {
        (Some(id), _) => id.clone(),
        (None, Some(name)) => project_id_by_name(&server, name)?,
        (None, None) => {
            return Err(Error::InvalidArgument(
                "one of --flow-id, --project-id or --project-name is required".to_string(),
            ));
        }
    };

    let batch = pusher.push_project(&project_id, args.project_only)?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else if !ctx.quiet {
        report::print_batch("Push", &batch);
    }
    Ok(())
}

/// Print a single-item result; a failed item becomes the command's error.
pub(super) fn finish_single(ctx: &Context, item: ItemReport) -> Result<()> {
    if let SyncOutcome::Error(reason) = &item.outcome {
        return Err(Error::SyncFailed {
            name: item.name.clone(),
            reason: reason.clone(),
        });
    }
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else if !ctx.quiet {
        report::print_item(&item);
    }
    Ok(())
}
