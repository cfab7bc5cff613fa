//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// `gsecret` command-line interface for remote secrets with a local fallback
#[derive(Parser)]
#[command(name = "gsecret")]
#[command(author, version, about = "Store and fetch secrets in Google Secret Manager with a local fallback")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and requested values
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not contact the remote store; use local state only
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Set the remote project id
    #[command(about = "Set the project id used for all secret operations")]
    Setid {
        /// Project id (prompted when omitted)
        project_id: Option<String>,
    },

    /// Show the remote project id
    #[command(about = "Show the configured project id")]
    Getid,

    /// List secrets
    #[command(about = "List secrets with their numeric aliases")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add a secret
    #[command(about = "Add a new secret; the value is read from a hidden prompt or stdin")]
    Add {
        /// Secret id (prompted when omitted)
        id: Option<String>,

        /// Encrypt the value with a password before storing it
        #[arg(short, long)]
        protect: bool,
    },

    /// Get a secret
    #[command(about = "Show a secret by id or numeric alias, optionally at a version")]
    Get {
        /// `<ID_OR_INDEX>[@<VERSION>]`
        #[arg(value_name = "ID_OR_INDEX[@VERSION]")]
        secret: String,

        /// Print only the value
        #[arg(long)]
        raw: bool,

        /// Never ask for a decryption password
        #[arg(long)]
        no_prompt: bool,
    },

    /// Remove a secret
    #[command(about = "Delete a secret after a cancellable countdown")]
    Remove {
        /// Secret id or numeric alias (prompted when omitted)
        #[arg(value_name = "ID_OR_INDEX")]
        id: Option<String>,

        /// Countdown length in seconds (overrides the configured value)
        #[arg(long, value_name = "SECS")]
        countdown: Option<u64>,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table with aliases
    #[default]
    Table,
    /// JSON document
    Json,
}
