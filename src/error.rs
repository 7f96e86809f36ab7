//! Error types for dependency sync operations.
//!
//! This module defines [`SyncError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - The four sync failures (`GroupNotFound`, `ResolutionConflict`,
//!   `ToolUnavailable`, `NetworkError`) are what callers match on
//! - Failures of the package manager are never retried or recovered locally
//! - The package manager's own exit code is carried through so the process
//!   can exit with it

use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when the package manager executable cannot be found.
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;

/// Exit code used when the package manager was killed or timed out.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit code used for configuration and preflight failures.
pub const EXIT_USAGE: i32 = 2;

/// Core error type for dependency sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A requested dependency group is not declared by the project.
    #[error("Dependency group '{group}' is not declared by the project")]
    GroupNotFound {
        group: String,
        /// Exit code of the package manager, if it ran at all.
        code: Option<i32>,
    },

    /// Locked versions cannot be installed on this platform or interpreter.
    #[error("Locked dependencies cannot be resolved: {message}")]
    ResolutionConflict { message: String, code: Option<i32> },

    /// The package manager could not be located, started, or was interrupted.
    #[error("Package manager '{tool}' is unavailable: {reason}")]
    ToolUnavailable {
        tool: String,
        reason: String,
        /// True when the process started but was killed or timed out.
        interrupted: bool,
    },

    /// Package downloads could not complete.
    #[error("Network error while syncing: {message}")]
    NetworkError { message: String, code: Option<i32> },

    /// The package manager failed for a reason that could not be classified.
    #[error("Sync failed with exit code {code}")]
    SyncFailed { code: i32 },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Configuration file given explicitly does not exist.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Failed to parse the project manifest.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Process exit code for this error.
    ///
    /// The package manager's exit code wins whenever it produced one.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::GroupNotFound { code, .. }
            | Self::ResolutionConflict { code, .. }
            | Self::NetworkError { code, .. } => nonzero(*code).unwrap_or(EXIT_USAGE),
            Self::ToolUnavailable { interrupted, .. } => {
                if *interrupted {
                    EXIT_INTERRUPTED
                } else {
                    EXIT_TOOL_NOT_FOUND
                }
            }
            Self::SyncFailed { code } => nonzero(Some(*code)).unwrap_or(1),
            Self::ConfigParseError { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigValidationError { .. }
            | Self::ManifestParseError { .. } => EXIT_USAGE,
            Self::Io(_) | Self::Other(_) => 1,
        }
    }

    /// Whether the package manager ran and reported this failure itself.
    pub fn reported_by_tool(&self) -> bool {
        match self {
            Self::GroupNotFound { code, .. }
            | Self::ResolutionConflict { code, .. }
            | Self::NetworkError { code, .. } => code.is_some(),
            Self::SyncFailed { .. } => true,
            _ => false,
        }
    }
}

fn nonzero(code: Option<i32>) -> Option<i32> {
    code.filter(|c| *c != 0)
}

/// Result type alias for dependency sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_not_found_displays_group() {
        let err = SyncError::GroupNotFound {
            group: "docs".into(),
            code: None,
        };
        assert!(err.to_string().contains("'docs'"));
    }

    #[test]
    fn tool_unavailable_displays_tool_and_reason() {
        let err = SyncError::ToolUnavailable {
            tool: "uv".into(),
            reason: "not found on PATH".into(),
            interrupted: false,
        };
        let msg = err.to_string();
        assert!(msg.contains("uv"));
        assert!(msg.contains("not found on PATH"));
    }

    #[test]
    fn tool_exit_code_is_propagated() {
        let err = SyncError::ResolutionConflict {
            message: "no solution".into(),
            code: Some(3),
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(SyncError::SyncFailed { code: 42 }.exit_code(), 42);
    }

    #[test]
    fn preflight_group_not_found_uses_usage_code() {
        let err = SyncError::GroupNotFound {
            group: "test".into(),
            code: None,
        };
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(!err.reported_by_tool());
    }

    #[test]
    fn tool_unavailable_codes() {
        let missing = SyncError::ToolUnavailable {
            tool: "uv".into(),
            reason: "missing".into(),
            interrupted: false,
        };
        let killed = SyncError::ToolUnavailable {
            tool: "uv".into(),
            reason: "timed out".into(),
            interrupted: true,
        };
        assert_eq!(missing.exit_code(), EXIT_TOOL_NOT_FOUND);
        assert_eq!(killed.exit_code(), EXIT_INTERRUPTED);
    }

    #[test]
    fn exit_code_is_never_zero() {
        let err = SyncError::SyncFailed { code: 0 };
        assert_eq!(err.exit_code(), 1);
        let err = SyncError::NetworkError {
            message: "reset".into(),
            code: Some(0),
        };
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
