//! Sync command implementation.
//!
//! `install-deps sync` (or plain `install-deps`) runs the package manager's
//! sync with the configured groups.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::cli::args::SyncArgs;
use crate::error::Result;
use crate::shell::OutputLine;
use crate::sync::{passthrough, DependencySyncRunner, OutputSink, ProcessManager, SyncPlan};
use crate::ui::{OutputMode, SpinnerHandle, Theme, UserInterface};

use super::dispatcher::{Command, CommandResult, ProjectContext};

/// The sync command implementation.
pub struct SyncCommand {
    context: ProjectContext,
    args: SyncArgs,
}

impl SyncCommand {
    /// Create a new sync command.
    pub fn new(context: ProjectContext, args: SyncArgs) -> Self {
        Self { context, args }
    }

    /// Resolve the plan this command would run.
    pub fn plan(&self) -> Result<SyncPlan> {
        let config = self.context.load_config(&self.args.selection)?;
        Ok(SyncPlan::resolve(&self.context.project_root, &config))
    }
}

/// Output handling for one run, chosen by output mode.
struct OutputRouting {
    sink: OutputSink,
    spinner: Option<Box<dyn SpinnerHandle>>,
    replay: Arc<Mutex<Vec<String>>>,
}

impl OutputRouting {
    fn for_mode(ui: &mut dyn UserInterface, plan: &SyncPlan) -> Self {
        let replay = Arc::new(Mutex::new(Vec::new()));
        if ui.output_mode().shows_tool_output() {
            return Self {
                sink: passthrough(),
                spinner: None,
                replay,
            };
        }

        let spinner = ui.start_spinner(&format!("Syncing {}", plan.groups));
        let live = spinner.output_sink();
        let buffer = Arc::clone(&replay);
        let sink: OutputSink = Arc::new(move |line: OutputLine| {
            if let OutputLine::Stderr(text) = &line {
                if let Ok(mut b) = buffer.lock() {
                    b.push(text.clone());
                }
            }
            if let Some(live) = &live {
                live(line);
            }
        });

        Self {
            sink,
            spinner: Some(spinner),
            replay,
        }
    }

    /// Write captured diagnostics to stderr after a quiet failure.
    fn replay_diagnostics(&self) {
        let Ok(lines) = self.replay.lock() else {
            return;
        };
        let mut err = io::stderr().lock();
        for line in lines.iter() {
            let _ = writeln!(err, "{}", line);
        }
    }
}

impl Command for SyncCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let plan = self.plan()?;

        if self.args.dry_run {
            ui.message(&plan.command);
            return Ok(CommandResult::success());
        }

        let verbose = ui.output_mode() == OutputMode::Verbose;
        if verbose {
            ui.message(&Theme::detect().format_command(&plan.command));
        }

        let mut routing = OutputRouting::for_mode(ui, &plan);
        let manager = ProcessManager::new(plan.invocation.clone()).with_output(Arc::clone(&routing.sink));
        let outcome = DependencySyncRunner::for_plan(&plan, manager)
            .and_then(|runner| runner.install_dependencies(&plan.groups));

        match outcome {
            Ok(()) => {
                let msg = format!("Environment synchronized ({})", plan.groups);
                if let Some(spinner) = routing.spinner.as_mut() {
                    spinner.finish_success(&msg);
                }
                ui.success(&msg);
                Ok(CommandResult::success())
            }
            Err(e) => {
                if let Some(spinner) = routing.spinner.as_mut() {
                    spinner.finish_error("Sync failed");
                    if e.reported_by_tool() {
                        routing.replay_diagnostics();
                    }
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::SelectionArgs;
    use crate::error::SyncError;
    use crate::ui::MockUI;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(root: &Path) -> ProjectContext {
        ProjectContext {
            project_root: root.to_path_buf(),
            config_path: None,
        }
    }

    #[test]
    fn dry_run_prints_command() {
        let temp = TempDir::new().unwrap();
        let args = SyncArgs {
            dry_run: true,
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let result = SyncCommand::new(context(temp.path()), args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.messages(), ["uv sync --group dev --group docs --group test"]);
    }

    #[test]
    fn dry_run_honours_group_flags() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("poetry.lock"), "").unwrap();
        let args = SyncArgs {
            selection: SelectionArgs {
                groups: vec!["docs".to_string()],
                ..Default::default()
            },
            dry_run: true,
        };
        let mut ui = MockUI::new();

        SyncCommand::new(context(temp.path()), args)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(ui.messages(), ["poetry sync --with docs"]);
    }

    #[test]
    fn undeclared_group_fails_before_running_tool() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[dependency-groups]\ndev = [\"ruff\"]\n",
        )
        .unwrap();
        // A program that cannot exist proves the tool was never spawned.
        fs::write(
            temp.path().join("install-deps.yml"),
            "program: /nonexistent/uv\n",
        )
        .unwrap();
        let mut ui = MockUI::new();

        let err = SyncCommand::new(context(temp.path()), SyncArgs::default())
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, SyncError::GroupNotFound { ref group, code: None } if group == "docs"));
    }

    #[test]
    fn missing_program_is_tool_unavailable() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("install-deps.yml"),
            "program: /nonexistent/uv\n",
        )
        .unwrap();
        let mut ui = MockUI::with_mode(OutputMode::Quiet);

        let err = SyncCommand::new(context(temp.path()), SyncArgs::default())
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, SyncError::ToolUnavailable { .. }));
        assert_eq!(ui.spinners().len(), 1);
        assert_eq!(ui.spinner_outcomes(), vec![Err("Sync failed".to_string())]);
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("install-deps.yml"), "timeout: 0\n").unwrap();
        let mut ui = MockUI::new();

        let err = SyncCommand::new(context(temp.path()), SyncArgs::default())
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, SyncError::ConfigValidationError { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn verbose_success_reports_status() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("fake-uv");
        fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(
            temp.path().join("install-deps.yml"),
            format!("program: {}\n", tool.display()),
        )
        .unwrap();
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        let result = SyncCommand::new(context(temp.path()), SyncArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.successes(), ["Environment synchronized (dev, docs, test)"]);
    }
}
