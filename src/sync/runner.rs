//! Dependency sync runner.

use std::path::Path;

use crate::config::SyncConfig;
use crate::detection::DeclaredGroups;
use crate::error::{Result, SyncError};

use super::manager::{PackageManager, ProcessManager, SyncStatus};
use super::patterns::classify_failure;
use super::plan::{GroupSet, SyncPlan};

/// Synchronizes an environment through an injected [`PackageManager`].
///
/// When the project's declared groups are known, requests for undeclared
/// groups fail with [`SyncError::GroupNotFound`] before the tool is started,
/// so the environment is left untouched. Without them the tool itself is the
/// judge.
pub struct DependencySyncRunner<M> {
    manager: M,
    declared: Option<DeclaredGroups>,
}

impl<M: PackageManager> DependencySyncRunner<M> {
    /// Create a runner with no preflight information.
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            declared: None,
        }
    }

    /// Check requested groups against `declared` before syncing.
    pub fn with_declared_groups(mut self, declared: Option<DeclaredGroups>) -> Self {
        self.declared = declared;
        self
    }

    /// Fail with `GroupNotFound` for the first requested group that is not
    /// declared. Passes when nothing is known about declared groups.
    pub fn preflight(&self, groups: &GroupSet) -> Result<()> {
        let Some(declared) = &self.declared else {
            return Ok(());
        };
        match declared.missing(groups.as_slice()).first() {
            Some(group) => Err(SyncError::GroupNotFound {
                group: group.to_string(),
                code: None,
            }),
            None => Ok(()),
        }
    }

    /// Sync the default group plus `groups`.
    ///
    /// Blocks until the package manager exits. Nothing is retried.
    pub fn install_dependencies(&self, groups: &GroupSet) -> Result<()> {
        self.preflight(groups)?;

        tracing::info!("Syncing with {} (groups: {})", self.manager.name(), groups);
        let status = self.manager.sync(groups.as_slice())?;
        self.interpret(status)
    }

    fn interpret(&self, status: SyncStatus) -> Result<()> {
        if status.is_success() {
            tracing::info!("Environment synchronized");
            return Ok(());
        }

        if status.timed_out {
            return Err(SyncError::ToolUnavailable {
                tool: self.manager.name().to_string(),
                reason: "interrupted after exceeding the timeout".to_string(),
                interrupted: true,
            });
        }

        match status.exit_code {
            None => Err(SyncError::ToolUnavailable {
                tool: self.manager.name().to_string(),
                reason: "terminated by a signal".to_string(),
                interrupted: true,
            }),
            Some(code) => {
                let err = classify_failure(&status.diagnostics, code);
                tracing::debug!("Classified failure: {:?}", err);
                Err(err)
            }
        }
    }
}

impl DependencySyncRunner<ProcessManager> {
    /// Build a runner for a resolved plan, loading declared groups from
    /// `pyproject.toml` when the plan asks for a preflight.
    pub fn for_plan(plan: &SyncPlan, manager: ProcessManager) -> Result<Self> {
        let declared = if plan.preflight {
            DeclaredGroups::load(&plan.invocation.cwd, plan.tool())?
        } else {
            None
        };
        if declared.is_none() && plan.preflight {
            tracing::debug!("No pyproject.toml found; skipping group preflight");
        }
        Ok(Self::new(manager).with_declared_groups(declared))
    }
}

/// Sync a project's environment using its configuration.
///
/// Tool output is streamed to this process's stdout and stderr unchanged.
pub fn install_dependencies(project_root: &Path, config: &SyncConfig) -> Result<()> {
    let plan = SyncPlan::resolve(project_root, config);
    let manager = ProcessManager::new(plan.invocation.clone());
    DependencySyncRunner::for_plan(&plan, manager)?.install_dependencies(&plan.groups)
}
