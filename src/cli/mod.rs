//! CLI definitions using clap.

use clap::{ArgGroup, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;
pub mod context;
pub mod prompt;

/// Sync flows between a flow server and a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "flowsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile to use (default: the registered default profile)
    #[arg(long, global = true, env = "FLOWSYNC_PROFILE")]
    pub profile: Option<String>,

    /// Configuration directory (default: ~/.flowsync)
    #[arg(long, global = true, env = "FLOWSYNC_HOME")]
    pub config_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage flow server profiles
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },

    /// Manage flows on the server
    Flows {
        #[command(subcommand)]
        command: FlowsCommands,
    },

    /// Manage projects on the server
    Projects {
        #[command(subcommand)]
        command: ProjectsCommands,
    },

    /// Read server settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Sync with a GitHub repository
    Git {
        #[command(subcommand)]
        command: GitCommands,
    },

    /// Show the current profile, remote and branch
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Env Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// Register (or replace) a profile
    Register {
        /// Profile name
        name: String,

        /// Flow server URL, e.g. http://localhost:7860
        #[arg(long)]
        url: String,

        /// API key for the server
        #[arg(long, env = "FLOWSYNC_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// List registered profiles
    List,

    /// Show the active profile
    Current,

    /// Make a profile the default
    Select {
        /// Profile name
        name: String,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

// ============================================================================
// Server Records
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum FlowsCommands {
    /// List flows
    List {
        /// Only flows in this project
        #[arg(long, conflicts_with = "project_name")]
        project_id: Option<String>,

        /// Only flows in the project with this name
        #[arg(long)]
        project_name: Option<String>,
    },

    /// Show one flow
    Get {
        /// Flow ID
        id: String,
    },

    /// Create a flow
    Create {
        /// Flow name (overrides a name in the data)
        #[arg(long)]
        name: Option<String>,

        /// Flow fields as a JSON object
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,

        /// Read the flow fields from a JSON file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Project to put the flow in
        #[arg(long, conflicts_with = "project_name")]
        project_id: Option<String>,

        /// Name of the project to put the flow in
        #[arg(long)]
        project_name: Option<String>,
    },

    /// Update fields of a flow
    Update {
        /// Flow ID
        id: String,

        /// Fields to change, as a JSON object
        #[arg(long)]
        data: String,
    },

    /// Delete a flow
    Delete {
        /// Flow ID
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommands {
    /// List projects
    List,

    /// Show one project
    Get {
        /// Project ID
        id: String,
    },

    /// Create a project
    Create {
        /// Project name
        #[arg(long)]
        name: String,

        /// Extra project fields as a JSON object
        #[arg(long)]
        data: Option<String>,
    },

    /// Update fields of a project
    Update {
        /// Project ID
        id: String,

        /// Fields to change, as a JSON object
        #[arg(long)]
        data: String,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the server configuration
    Get,
}

// ============================================================================
// Git Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum GitCommands {
    /// Manage remotes
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },

    /// Manage branches on the selected remote
    Branch {
        #[command(subcommand)]
        command: BranchCommands,
    },

    /// Select an existing branch
    Checkout {
        /// Branch name
        branch: String,

        /// Remote name (overrides current selection)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Select a branch, optionally creating it
    Switch {
        /// Branch name
        branch: String,

        /// Create the branch if it does not exist
        #[arg(short, long)]
        create: bool,

        /// Source branch when creating (default: repository default branch)
        #[arg(long, requires = "create")]
        from_branch: Option<String>,

        /// Remote name (overrides current selection)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Open a pull request
    Pr(PrArgs),

    /// Push flows from the server to the repository
    Push(PushArgs),

    /// Pull flows from the repository to the server
    Pull(PullArgs),
}

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Register (or replace) a remote
    Add {
        /// Remote name
        name: String,

        /// Repository URL (https or ssh form)
        url: String,

        /// Personal access token
        #[arg(long, env = "FLOWSYNC_GIT_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// List registered remotes
    List,

    /// Remove a remote
    Remove {
        /// Remote name
        name: String,
    },

    /// Replace a remote's access token
    SetToken {
        /// Remote name
        name: String,

        /// Personal access token
        #[arg(long, env = "FLOWSYNC_GIT_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Select a remote (and optionally a branch) for the current profile
    Select {
        /// Remote name
        name: String,

        /// Branch to select at the same time
        branch: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BranchCommands {
    /// List branches
    List {
        /// Remote name (overrides current selection)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Create a branch
    Create {
        /// Branch name
        name: String,

        /// Source branch (default: repository default branch)
        #[arg(long)]
        from: Option<String>,

        /// Remote name (overrides current selection)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Delete a branch
    Delete {
        /// Branch name
        name: String,

        /// Remote name (overrides current selection)
        #[arg(long)]
        remote: Option<String>,
    },
}

/// Where a sync command reads or writes.
#[derive(Args, Debug, Default)]
pub struct RemoteArgs {
    /// Remote name (overrides current selection)
    #[arg(long)]
    pub remote: Option<String>,

    /// Branch name (overrides current selection)
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args, Debug)]
pub struct PrArgs {
    /// Head branch (default: current branch)
    #[arg(long)]
    pub source_branch: Option<String>,

    /// Base branch (default: repository default branch)
    #[arg(long)]
    pub target_branch: Option<String>,

    /// Title (default: derived from the branch name)
    #[arg(long)]
    pub title: Option<String>,

    /// Body text (default: recent commit summaries)
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the body from a markdown file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Open as a draft
    #[arg(long)]
    pub draft: bool,

    /// Remote name (overrides current selection)
    #[arg(long)]
    pub remote: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["flow_id", "project_id", "project_name"])
))]
#[command(group(ArgGroup::new("project").args(["project_id", "project_name"])))]
pub struct PushArgs {
    /// Push a single flow
    #[arg(long)]
    pub flow_id: Option<String>,

    /// Push a project and its flows
    #[arg(long)]
    pub project_id: Option<String>,

    /// Push a project (looked up by name) and its flows
    #[arg(long)]
    pub project_name: Option<String>,

    /// Push only the project metadata, not its flows
    #[arg(long, requires = "project")]
    pub project_only: bool,

    /// Commit message (default: generated per file)
    #[arg(short, long)]
    pub message: Option<String>,

    #[command(flatten)]
    pub location: RemoteArgs,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["path", "project_id", "project_name", "flow_id"])
))]
pub struct PullArgs {
    /// Path of a flow document, e.g. projects/Sales/My_Flow_42.json
    pub path: Option<String>,

    /// Pull a whole project folder by recorded project ID
    #[arg(long)]
    pub project_id: Option<String>,

    /// Pull a whole project folder by project name
    #[arg(long)]
    pub project_name: Option<String>,

    /// Not supported: pass the flow's path instead
    #[arg(long, hide = true)]
    pub flow_id: Option<String>,

    /// Skip the server version comparison
    #[arg(long)]
    pub ignore_version_check: bool,

    #[command(flatten)]
    pub location: RemoteArgs,
}
