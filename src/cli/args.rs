//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. Run without a subcommand the
//! tool syncs, so `install-deps` alone does the whole job. Sync flags given
//! before a subcommand are ignored in favour of the subcommand's own.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::SyncConfig;
use crate::detection::ToolKind;

/// Synchronize the project environment with its lockfile.
#[derive(Debug, Parser)]
#[command(name = "install-deps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides install-deps.yml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show progress and a final status line
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Show a spinner instead of tool output; replay diagnostics on failure
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Options for the default sync
    #[command(flatten)]
    pub sync: SyncArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sync the environment (default if no command specified)
    Sync(SyncArgs),

    /// Resolve the sync command and check groups without running it
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// What to sync and how. Each flag overrides the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SelectionArgs {
    /// Dependency group to sync (repeatable or comma-separated; replaces configured groups)
    #[arg(short, long = "group", value_name = "NAME", value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Package manager to use instead of detecting it from the lockfile
    #[arg(long, value_enum)]
    pub tool: Option<ToolKind>,

    /// Fail if the lockfile is out of date
    #[arg(long)]
    pub locked: bool,

    /// Kill the package manager after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip checking groups against pyproject.toml
    #[arg(long)]
    pub no_preflight: bool,
}

impl SelectionArgs {
    /// Apply flag overrides on top of file configuration.
    pub fn apply(&self, config: &mut SyncConfig) {
        if !self.groups.is_empty() {
            config.groups = self.groups.clone();
        }
        if let Some(tool) = self.tool {
            config.tool = Some(tool);
            // A program configured for another tool no longer applies.
            config.program = None;
        }
        if self.locked {
            config.locked = true;
        }
        if self.timeout.is_some() {
            config.timeout = self.timeout;
        }
        if self.no_preflight {
            config.preflight = false;
        }
    }
}

/// Arguments for the `sync` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the command without running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
