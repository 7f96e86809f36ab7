//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::merger::merge_configs;
use crate::config::schema::SyncConfig;
use crate::error::{Result, SyncError};

/// Project config file name.
pub const PROJECT_CONFIG: &str = "install-deps.yml";

/// Local override file name (not meant to be committed).
pub const LOCAL_CONFIG: &str = "install-deps.local.yml";

/// Paths to configuration files in merge order (later overrides earlier).
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project config: install-deps.yml
    pub project: Option<PathBuf>,

    /// Local overrides: install-deps.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(PROJECT_CONFIG)),
            project_local: existing(project_root.join(LOCAL_CONFIG)),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(&self.project_local).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

/// Parse YAML content into a [`SyncConfig`].
pub fn parse_config(content: &str, source_path: &Path) -> Result<SyncConfig> {
    let value = parse_value(content, source_path)?;
    from_value(value, source_path)
}

/// Load a config file as a raw YAML value (for merging).
///
/// An empty file yields an empty mapping.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SyncError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SyncError::Io(e)
        }
    })?;

    parse_value(&content, path)
}

fn parse_value(content: &str, source_path: &Path) -> Result<Value> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| SyncError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(if value.is_null() {
        Value::Mapping(Default::default())
    } else {
        value
    })
}

fn from_value(value: Value, source_path: &Path) -> Result<SyncConfig> {
    let config: SyncConfig =
        serde_yaml::from_value(value).map_err(|e| SyncError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration for a project.
///
/// With `explicit`, only that file is read and it must exist. Otherwise the
/// project and local files are discovered and deep-merged; when neither
/// exists the defaults are returned.
///
/// # Errors
///
/// Returns `ConfigNotFound` if `explicit` does not exist.
/// Returns `ConfigParseError` if any file is invalid YAML or has unknown keys.
/// Returns `ConfigValidationError` if the merged values are unusable.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<SyncConfig> {
    if let Some(path) = explicit {
        tracing::debug!("Loading config from {}", path.display());
        let value = load_config_value(path)?;
        return from_value(value, path);
    }

    let paths = ConfigPaths::discover(project_root);
    let existing = paths.all_existing();
    if existing.is_empty() {
        tracing::debug!("No config found in {}, using defaults", project_root.display());
        return Ok(SyncConfig::default());
    }

    let values = existing
        .iter()
        .map(|p| {
            tracing::debug!("Loading config from {}", p.display());
            load_config_value(p)
        })
        .collect::<Result<Vec<_>>>()?;

    let source = existing.last().map(|p| p.as_path()).unwrap_or(project_root);
    from_value(merge_configs(&values), source)
}
