//! `flowsync git ...` dispatch.

use crate::cli::GitCommands;
use crate::cli::context::Context;
use crate::error::Result;

use super::{branch, pr, pull, push, remote};

/// Execute a git command.
pub fn execute(command: &GitCommands, ctx: &mut Context) -> Result<()> {
    match command {
        GitCommands::Remote { command } => remote::execute(command, ctx),
        GitCommands::Branch { command } => branch::execute(command, ctx),
        GitCommands::Checkout { branch: name, remote } => {
            branch::execute_checkout(ctx, name, remote.as_deref())
        }
        GitCommands::Switch {
            branch: name,
            create,
            from_branch,
            remote,
        } => branch::execute_switch(ctx, name, *create, from_branch.as_deref(), remote.as_deref()),
        GitCommands::Pr(args) => pr::execute(args, ctx),
        GitCommands::Push(args) => push::execute(args, ctx),
        GitCommands::Pull(args) => pull::execute(args, ctx),
    }
}
