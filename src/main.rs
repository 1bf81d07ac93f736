//! flowsync CLI entry point.

use clap::Parser;
use flowsync::cli::commands;
use flowsync::cli::context::Context;
use flowsync::cli::{Cli, Commands};
use flowsync::error::Error;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli, cli.json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        Commands::Version => {
            let ctx = Context::open(cli, json).ok();
            commands::version::execute(ctx.as_ref(), json)
        }
        Commands::Completions { shell } => commands::completions::execute(*shell),

        Commands::Env { command } => commands::env::execute(command, &mut Context::open(cli, json)?),
        Commands::Status => commands::status::execute(&Context::open(cli, json)?),

        // Server records
        Commands::Flows { command } => commands::flows::execute(command, &Context::open(cli, json)?),
        Commands::Projects { command } => {
            commands::projects::execute(command, &Context::open(cli, json)?)
        }
        Commands::Settings { command } => {
            commands::settings::execute(command, &Context::open(cli, json)?)
        }

        // Sync
        Commands::Git { command } => commands::git::execute(command, &mut Context::open(cli, json)?),
    }
}
