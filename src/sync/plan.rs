//! Group sets and the resolved tool invocation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::{SyncConfig, DEFAULT_GROUPS};
use crate::detection::{detect_tool, normalize_group, ToolKind};
use crate::shell::CommandSpec;

/// Ordered, de-duplicated dependency group names.
///
/// The default group is implicit and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupSet(Vec<String>);

impl GroupSet {
    /// Build from names, keeping the first spelling of each group.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = Vec::new();
        let mut groups = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            let key = normalize_group(name);
            if name.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            groups.push(name.to_string());
        }
        Self(groups)
    }

    /// `dev`, `docs`, `test`.
    pub fn defaults() -> Self {
        Self::new(DEFAULT_GROUPS)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for GroupSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl std::fmt::Display for GroupSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("(default only)")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}

/// How to invoke a package manager, independent of which groups are synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocation {
    pub tool: ToolKind,
    pub program: String,
    pub cwd: PathBuf,
    pub locked: bool,
    pub extra_args: Vec<String>,
    #[serde(rename = "timeout_secs", serialize_with = "serialize_secs")]
    pub timeout: Option<Duration>,
}

fn serialize_secs<S: serde::Serializer>(
    timeout: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timeout {
        Some(d) => serializer.serialize_some(&d.as_secs()),
        None => serializer.serialize_none(),
    }
}

impl ToolInvocation {
    /// Invocation of `tool` by its default executable name.
    pub fn new(tool: ToolKind, cwd: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: tool.program().to_string(),
            cwd: cwd.into(),
            locked: false,
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    /// Full argument list for a sync over `groups`.
    pub fn args_for(&self, groups: &[String]) -> Vec<String> {
        let mut args = self.tool.sync_args(groups, self.locked);
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Process spec for a sync over `groups`.
    pub fn command_spec(&self, groups: &[String]) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(self.args_for(groups))
            .cwd(&self.cwd)
            .timeout(self.timeout)
    }
}

/// Everything needed to run one sync, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    #[serde(flatten)]
    pub invocation: ToolInvocation,
    pub groups: GroupSet,
    pub preflight: bool,
    /// Rendered command line.
    pub command: String,
}

impl SyncPlan {
    /// Resolve a plan for `project_root` from merged configuration.
    pub fn resolve(project_root: &Path, config: &SyncConfig) -> Self {
        let tool = config.tool.unwrap_or_else(|| {
            let detected = detect_tool(project_root);
            tracing::debug!("Detected package manager: {}", detected);
            detected
        });

        let invocation = ToolInvocation {
            program: config
                .program
                .clone()
                .unwrap_or_else(|| tool.program().to_string()),
            locked: config.locked,
            extra_args: config.extra_args.clone(),
            timeout: config.timeout_duration(),
            ..ToolInvocation::new(tool, project_root)
        };
        let groups = GroupSet::new(&config.groups);
        let command = invocation.command_spec(groups.as_slice()).display();

        Self {
            invocation,
            groups,
            preflight: config.preflight,
            command,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.invocation.tool
    }
}
