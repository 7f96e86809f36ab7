//! Command dispatching.

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands, SelectionArgs};
use crate::config::{load_config, SyncConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Errors carry their own exit code; see [`crate::SyncError::exit_code`].
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }
}

/// Where a command finds its project and configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub project_root: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl ProjectContext {
    /// Load file configuration and apply flag overrides.
    pub fn load_config(&self, selection: &SelectionArgs) -> Result<SyncConfig> {
        let mut config = load_config(&self.project_root, self.config_path.as_deref())?;
        selection.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: ProjectContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            context: ProjectContext {
                project_root,
                config_path: None,
            },
        }
    }

    /// Use an explicit config file instead of discovery.
    pub fn with_config(mut self, config_path: Option<PathBuf>) -> Self {
        self.context.config_path = config_path;
        self
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Sync(args)) => {
                super::sync::SyncCommand::new(self.context.clone(), args.clone()).execute(ui)
            }
            Some(Commands::Check(args)) => {
                super::check::CheckCommand::new(self.context.clone(), args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                super::sync::SyncCommand::new(self.context.clone(), cli.sync.clone()).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn bare_invocation_dispatches_to_sync() {
        use clap::Parser;

        let temp = TempDir::new().unwrap();
        let config = temp.path().join("ci.yml");
        fs::write(&config, "tool: pdm\ngroups: [test]\n").unwrap();
        let cli = Cli::parse_from(["install-deps", "--dry-run"]);
        let mut ui = crate::ui::MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .with_config(Some(config))
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.messages(), ["pdm sync --clean -G test"]);
    }

    #[test]
    fn flags_override_file_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("install-deps.yml"), "groups: [dev]\ntimeout: 10\n").unwrap();
        let context = ProjectContext {
            project_root: temp.path().to_path_buf(),
            config_path: None,
        };
        let selection = SelectionArgs {
            groups: vec!["test".to_string()],
            ..Default::default()
        };

        let config = context.load_config(&selection).unwrap();

        assert_eq!(config.groups, ["test"]);
        assert_eq!(config.timeout, Some(10));
    }

    #[test]
    fn invalid_flag_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        let context = ProjectContext {
            project_root: temp.path().to_path_buf(),
            config_path: None,
        };
        let selection = SelectionArgs {
            timeout: Some(0),
            ..Default::default()
        };

        assert!(context.load_config(&selection).is_err());
    }
}
