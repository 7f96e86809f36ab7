//! Check command implementation.
//!
//! `install-deps check` resolves the sync without running it: which tool and
//! command would be used, whether the tool is installed, and whether every
//! requested group is declared.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::CheckArgs;
use crate::detection::DeclaredGroups;
use crate::error::{Result, SyncError};
use crate::shell::{execute, find_on_path, CommandSpec};
use crate::sync::SyncPlan;
use crate::ui::{Theme, UserInterface};

use super::dispatcher::{Command, CommandResult, ProjectContext};

/// What `check` found.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    #[serde(flatten)]
    pub plan: SyncPlan,

    /// Resolved executable path, if the tool was found.
    pub tool_path: Option<PathBuf>,

    /// First line of `<tool> --version`.
    pub tool_version: Option<String>,

    /// Groups declared in pyproject.toml (None when there is no manifest).
    pub declared_groups: Option<Vec<String>>,

    /// Requested groups that are not declared.
    pub missing_groups: Vec<String>,
}

impl CheckReport {
    /// The first problem found, as the error a sync would fail with.
    pub fn problem(&self) -> Option<SyncError> {
        if let Some(group) = self.missing_groups.first() {
            return Some(SyncError::GroupNotFound {
                group: group.clone(),
                code: None,
            });
        }
        if self.tool_path.is_none() {
            return Some(SyncError::ToolUnavailable {
                tool: self.plan.tool().to_string(),
                reason: format!("'{}' was not found on PATH", self.plan.invocation.program),
                interrupted: false,
            });
        }
        None
    }
}

/// The check command implementation.
pub struct CheckCommand {
    context: ProjectContext,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(context: ProjectContext, args: CheckArgs) -> Self {
        Self { context, args }
    }

    /// Build the report without printing anything.
    pub fn report(&self) -> Result<CheckReport> {
        let config = self.context.load_config(&self.args.selection)?;
        let plan = SyncPlan::resolve(&self.context.project_root, &config);

        let declared = if plan.preflight {
            DeclaredGroups::load(&self.context.project_root, plan.tool())?
        } else {
            None
        };
        let missing_groups = declared
            .as_ref()
            .map(|d| {
                d.missing(plan.groups.as_slice())
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let tool_path = find_on_path(&plan.invocation.program);
        let tool_version = tool_path.as_ref().and_then(|path| tool_version(path));

        Ok(CheckReport {
            tool_path,
            tool_version,
            declared_groups: declared.map(|d| d.iter().map(String::from).collect()),
            missing_groups,
            plan,
        })
    }

    fn show(&self, report: &CheckReport, ui: &mut dyn UserInterface) {
        let theme = Theme::detect();
        ui.message(&format!("Tool:     {}", report.plan.tool()));
        ui.message(&format!(
            "Command:  {}",
            theme.format_command(&report.plan.command)
        ));
        ui.message(&format!("Groups:   {}", report.plan.groups));

        match (&report.tool_path, &report.tool_version) {
            (Some(path), Some(version)) => {
                ui.message(&format!("Found:    {} ({})", path.display(), version))
            }
            (Some(path), None) => ui.message(&format!("Found:    {}", path.display())),
            (None, _) => ui.message("Found:    no"),
        }

        match &report.declared_groups {
            Some(groups) if groups.is_empty() => ui.message("Declared: (none)"),
            Some(groups) => ui.message(&format!("Declared: {}", groups.join(", "))),
            None if report.plan.preflight => ui.message("Declared: no pyproject.toml"),
            None => ui.message("Declared: not checked"),
        }

        for group in &report.missing_groups {
            ui.warning(&format!("Group '{}' is not declared", group));
        }
    }
}

/// Ask the tool for its version, keeping the first line.
fn tool_version(path: &std::path::Path) -> Option<String> {
    let spec = CommandSpec::new(path)
        .args(["--version"])
        .timeout(Some(std::time::Duration::from_secs(10)));
    match execute(&spec) {
        Ok(result) if result.success => result
            .stdout
            .lines()
            .next()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        Ok(result) => {
            tracing::debug!("{} --version exited with {:?}", path.display(), result.exit_code);
            None
        }
        Err(e) => {
            tracing::debug!("{} --version failed: {}", path.display(), e);
            None
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = self.report()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| SyncError::Other(e.into()))?;
            println!("{}", json);
        } else {
            self.show(&report, ui);
        }

        match report.problem() {
            Some(err) => Err(err),
            None => {
                ui.success("Ready to sync");
                Ok(CommandResult::success())
            }
        }
    }
}
