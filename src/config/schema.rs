//! Configuration schema for `install-deps.yml`.
//!
//! ```yaml
//! tool: uv              # uv | pdm | poetry; detected from the lockfile when absent
//! program: /opt/bin/uv  # executable override
//! groups: [dev, docs, test]
//! locked: false
//! extra_args: []
//! timeout: 600          # seconds
//! preflight: true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detection::ToolKind;
use crate::error::{Result, SyncError};

/// Groups synced alongside the default group unless configured otherwise.
pub const DEFAULT_GROUPS: [&str; 3] = ["dev", "docs", "test"];

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Package manager; detected from the project's lockfile when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolKind>,

    /// Executable to run instead of the tool's default name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Dependency groups to sync in addition to the default group.
    pub groups: Vec<String>,

    /// Refuse to sync when the lockfile is out of date.
    pub locked: bool,

    /// Extra arguments appended to the sync command.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// Kill the package manager after this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Check requested groups against `pyproject.toml` before syncing.
    pub preflight: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tool: None,
            program: None,
            groups: DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect(),
            locked: false,
            extra_args: Vec::new(),
            timeout: None,
            preflight: true,
        }
    }
}

impl SyncConfig {
    /// Timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        for group in &self.groups {
            let trimmed = group.trim();
            if trimmed.is_empty() {
                return Err(invalid("group names must not be empty"));
            }
            if trimmed.starts_with('-') {
                return Err(invalid(format!(
                    "group '{}' looks like a flag; use extra_args for tool options",
                    group
                )));
            }
            if trimmed.contains(char::is_whitespace) || trimmed.contains(',') {
                return Err(invalid(format!(
                    "group '{}' must not contain whitespace or commas",
                    group
                )));
            }
        }

        if self.timeout == Some(0) {
            return Err(invalid("timeout must be at least 1 second"));
        }

        if let Some(program) = &self.program {
            if program.trim().is_empty() {
                return Err(invalid("program must not be empty"));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SyncError {
    SyncError::ConfigValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_groups_are_dev_docs_test() {
        let config = SyncConfig::default();
        assert_eq!(config.groups, ["dev", "docs", "test"]);
        assert!(config.preflight);
        assert!(config.tool.is_none());
    }

    #[test]
    fn empty_mapping_uses_defaults() {
        let config: SyncConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
tool: poetry
program: /opt/poetry/bin/poetry
groups: [dev]
locked: true
extra_args: ["--no-root"]
timeout: 300
preflight: false
"#;
        let config: SyncConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tool, Some(ToolKind::Poetry));
        assert_eq!(config.program.as_deref(), Some("/opt/poetry/bin/poetry"));
        assert_eq!(config.groups, ["dev"]);
        assert!(config.locked);
        assert_eq!(config.extra_args, ["--no-root"]);
        assert_eq!(config.timeout_duration(), Some(Duration::from_secs(300)));
        assert!(!config.preflight);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<SyncConfig, _> = serde_yaml::from_str("gropus: [dev]");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let result: std::result::Result<SyncConfig, _> = serde_yaml::from_str("tool: pipenv");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_flag_like_group() {
        let config = SyncConfig {
            groups: vec!["--all-groups".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SyncError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_group_and_zero_timeout() {
        let blank = SyncConfig {
            groups: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let zero = SyncConfig {
            timeout: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn empty_group_list_is_valid() {
        let config = SyncConfig {
            groups: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
