//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::model::OperationKind;

pub mod commands;
pub mod progress;

/// redsync - Resumable bulk sync of redirect rules
#[derive(Parser, Debug)]
#[command(name = "redsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// State directory for checkpoints (default: ~/.redsync/state)
    #[arg(long, global = true, env = "REDSYNC_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Config file (default: ~/.redsync/config.json)
    #[arg(long, global = true, env = "REDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Import redirects from a file, resuming any interrupted run
    Import {
        /// JSON array or JSONL file of redirects
        file: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Delete remote redirects missing from the file once the import completes
        #[arg(long)]
        prune: bool,
    },

    /// Delete the redirects listed in a file (also resumes a failed prune)
    Delete {
        /// JSON array or JSONL file; only `from` is required per record
        file: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Show resume state of a file without contacting the remote
    Status {
        /// Input file
        file: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Inspect or reset stored checkpoints
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Account, workspace and batch size: everything that shapes a fingerprint and plan.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Account identifier
    #[arg(long, env = "REDSYNC_ACCOUNT")]
    pub account: Option<String>,

    /// Workspace identifier
    #[arg(long, env = "REDSYNC_WORKSPACE")]
    pub workspace: Option<String>,

    /// Maximum records per batch (default: 500)
    #[arg(long, env = "REDSYNC_BATCH_SIZE")]
    pub batch_size: Option<usize>,
}

/// Target plus how to reach the remote service.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Base URL of the redirect service
    #[arg(long, env = "REDSYNC_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API token
    #[arg(long, env = "REDSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl From<&TargetArgs> for Overrides {
    fn from(args: &TargetArgs) -> Self {
        Self {
            account: args.account.clone(),
            workspace: args.workspace.clone(),
            batch_size: args.batch_size,
            ..Default::default()
        }
    }
}

impl From<&ConnectionArgs> for Overrides {
    fn from(args: &ConnectionArgs) -> Self {
        Self {
            endpoint: args.endpoint.clone(),
            token: args.token.clone(),
            ..Self::from(&args.target)
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CheckpointCommands {
    /// List stored checkpoints
    List,

    /// Remove checkpoints so the next run starts from the first batch
    Clear {
        /// Operation kind of the checkpoint (import or delete)
        #[arg(long, requires = "fingerprint", conflicts_with = "all")]
        kind: Option<OperationKind>,

        /// Full fingerprint, as shown by `checkpoint list`
        #[arg(long, requires = "kind", conflicts_with = "all")]
        fingerprint: Option<String>,

        /// Remove every checkpoint
        #[arg(long, required_unless_present = "kind")]
        all: bool,
    },
}
