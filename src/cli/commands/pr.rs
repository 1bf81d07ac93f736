//! Pull request command.

use crate::cli::PrArgs;
use crate::cli::context::Context;
use crate::error::{Error, Result};
use crate::remote::{PullRequestDraft, RemoteRepository};
use colored::Colorize;
use tracing::debug;

const COMMITS_IN_BODY: usize = 10;

/// Open a pull request from the current (or given) branch.
pub fn execute(args: &PrArgs, ctx: &Context) -> Result<()> {
    let (_, client) = ctx.remote(args.remote.as_deref())?;

    let head = match &args.source_branch {
        Some(branch) => branch.clone(),
        None => {
            let profile = ctx.profile_name()?;
            ctx.registry
                .current(&profile)
                .branch
                .ok_or(Error::NoBranchSelected { profile })?
        }
    };
    let base = match &args.target_branch {
        Some(branch) => branch.clone(),
        None => client.default_branch()?,
    };

    let body = match &args.body_file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => args.body.clone(),
    };
    let draft = build_draft(&client, args, head, base, body)?;

    ctx.say(
        format!(
            "Creating pull request from '{}' to '{}'...",
            draft.head, draft.base
        )
        .cyan(),
    );
    let pr = client.create_pull_request(&draft)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&pr)?);
    } else {
        ctx.say(format!("{} Pull request created", "✓".green()));
        ctx.say(format!("PR #{}: {}", pr.number, pr.title).dimmed());
        ctx.say(format!("URL: {}", pr.url).dimmed());
    }
    Ok(())
}

/// Validate the branches and fill in the title and body.
fn build_draft(
    repo: &dyn RemoteRepository,
    args: &PrArgs,
    head: String,
    base: String,
    body: Option<String>,
) -> Result<PullRequestDraft> {
    if head == base {
        return Err(Error::InvalidArgument(format!(
            "source and target branches cannot be the same: {head}"
        )));
    }
    let available = repo.list_branches()?;
    for branch in [&head, &base] {
        if !available.contains(branch) {
            return Err(Error::BranchNotFound {
                name: branch.clone(),
                available,
            });
        }
    }
    if repo.find_pull_request(&head, &base)?.is_some() {
        return Err(Error::PullRequestExists { head, base });
    }

    let title = args
        .title
        .clone()
        .unwrap_or_else(|| PullRequestDraft::title_from_branch(&head));
    let body = body.unwrap_or_else(|| {
        let commits = repo
            .recent_commits(&head, COMMITS_IN_BODY)
            .inspect_err(|e| debug!(error = %e, "cannot read commits for PR body"))
            .unwrap_or_default();
        PullRequestDraft::body_from_commits(&head, &commits)
    });

    Ok(PullRequestDraft {
        title,
        body,
        head,
        base,
        draft: args.draft,
    })
}
