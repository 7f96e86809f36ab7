//! Package manager detection.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A supported Python package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Uv,
    Pdm,
    Poetry,
}

impl ToolKind {
    /// All supported tools, in detection order.
    pub const ALL: [ToolKind; 3] = [ToolKind::Uv, ToolKind::Pdm, ToolKind::Poetry];

    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            ToolKind::Uv => "uv",
            ToolKind::Pdm => "pdm",
            ToolKind::Poetry => "poetry",
        }
    }

    /// Lockfile this tool writes.
    pub fn lockfile(&self) -> &'static str {
        match self {
            ToolKind::Uv => "uv.lock",
            ToolKind::Pdm => "pdm.lock",
            ToolKind::Poetry => "poetry.lock",
        }
    }

    /// Arguments for a sync over `groups`.
    ///
    /// The default group is always included by the tool itself and is never
    /// named here.
    pub fn sync_args(&self, groups: &[String], locked: bool) -> Vec<String> {
        let mut args = vec!["sync".to_string()];
        match self {
            ToolKind::Uv => {
                for group in groups {
                    args.push("--group".to_string());
                    args.push(group.clone());
                }
                if locked {
                    args.push("--locked".to_string());
                }
            }
            ToolKind::Pdm => {
                args.push("--clean".to_string());
                for group in groups {
                    args.push("-G".to_string());
                    args.push(group.clone());
                }
            }
            ToolKind::Poetry => {
                if !groups.is_empty() {
                    args.push("--with".to_string());
                    args.push(groups.join(","));
                }
            }
        }
        if locked && *self != ToolKind::Uv {
            tracing::warn!("--locked has no effect with {}; it always syncs from the lock", self);
        }
        args
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Detect the package manager for a project from its lockfile.
///
/// Falls back to uv when no known lockfile is present.
pub fn detect_tool(project_root: &Path) -> ToolKind {
    ToolKind::ALL
        .into_iter()
        .find(|tool| project_root.join(tool.lockfile()).is_file())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detect_uv_lock() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("uv.lock"), "version = 1\n").unwrap();
        assert_eq!(detect_tool(temp.path()), ToolKind::Uv);
    }

    #[test]
    fn detect_pdm_lock() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pdm.lock"), "").unwrap();
        assert_eq!(detect_tool(temp.path()), ToolKind::Pdm);
    }

    #[test]
    fn detect_poetry_lock() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("poetry.lock"), "").unwrap();
        assert_eq!(detect_tool(temp.path()), ToolKind::Poetry);
    }

    #[test]
    fn uv_wins_when_several_lockfiles_exist() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("poetry.lock"), "").unwrap();
        fs::write(temp.path().join("uv.lock"), "").unwrap();
        assert_eq!(detect_tool(temp.path()), ToolKind::Uv);
    }

    #[test]
    fn empty_project_defaults_to_uv() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_tool(temp.path()), ToolKind::Uv);
    }

    #[test]
    fn uv_sync_args() {
        let args = ToolKind::Uv.sync_args(&groups(&["dev", "docs", "test"]), false);
        assert_eq!(
            args,
            ["sync", "--group", "dev", "--group", "docs", "--group", "test"]
        );
    }

    #[test]
    fn uv_locked_flag() {
        let args = ToolKind::Uv.sync_args(&groups(&["dev"]), true);
        assert_eq!(args.last().map(String::as_str), Some("--locked"));
    }

    #[test]
    fn pdm_sync_args_clean() {
        let args = ToolKind::Pdm.sync_args(&groups(&["dev", "test"]), false);
        assert_eq!(args, ["sync", "--clean", "-G", "dev", "-G", "test"]);
    }

    #[test]
    fn poetry_sync_args_join_groups() {
        let args = ToolKind::Poetry.sync_args(&groups(&["dev", "docs", "test"]), true);
        assert_eq!(args, ["sync", "--with", "dev,docs,test"]);
    }

    #[test]
    fn no_groups_is_plain_sync() {
        assert_eq!(ToolKind::Poetry.sync_args(&[], false), ["sync"]);
        assert_eq!(ToolKind::Uv.sync_args(&[], false), ["sync"]);
    }

    #[test]
    fn tool_flag_values() {
        use clap::ValueEnum;
        assert_eq!(ToolKind::from_str("UV", true), Ok(ToolKind::Uv));
        assert_eq!(ToolKind::from_str("poetry", false), Ok(ToolKind::Poetry));
        assert!(ToolKind::from_str("pip", true).is_err());
    }
}
