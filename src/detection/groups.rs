//! Dependency groups declared in `pyproject.toml`.
//!
//! Only group *names* are read. The manifest is never written, and the
//! lockfile itself stays opaque: the package manager remains the authority on
//! what a group resolves to.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use toml::Value;

use super::package_manager::ToolKind;
use crate::error::{Result, SyncError};

/// Manifest file name.
pub const MANIFEST: &str = "pyproject.toml";

/// Normalize a group name the way Python packaging compares names.
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`.
pub fn normalize_group(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// The set of dependency groups a project declares for a given tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredGroups {
    groups: BTreeSet<String>,
}

impl DeclaredGroups {
    /// Build from explicit names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            groups: names
                .into_iter()
                .map(|n| normalize_group(n.as_ref()))
                .collect(),
        }
    }

    /// Load declared groups from `<project_root>/pyproject.toml`.
    ///
    /// Returns `Ok(None)` when the project has no manifest.
    pub fn load(project_root: &Path, tool: ToolKind) -> Result<Option<Self>> {
        let path = project_root.join(MANIFEST);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::Io(e)),
        };
        Self::parse(&content, &path, tool).map(Some)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, source_path: &Path, tool: ToolKind) -> Result<Self> {
        let doc: Value = toml::from_str(content).map_err(|e| SyncError::ManifestParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut names: Vec<String> = table_keys(&doc, &["dependency-groups"]);

        match tool {
            ToolKind::Uv => {
                if lookup(&doc, &["tool", "uv", "dev-dependencies"]).is_some() {
                    names.push("dev".to_string());
                }
            }
            ToolKind::Pdm => {
                names.extend(table_keys(&doc, &["tool", "pdm", "dev-dependencies"]));
                names.extend(table_keys(&doc, &["project", "optional-dependencies"]));
            }
            ToolKind::Poetry => {
                names.extend(table_keys(&doc, &["tool", "poetry", "group"]));
                if lookup(&doc, &["tool", "poetry", "dev-dependencies"]).is_some() {
                    names.push("dev".to_string());
                }
            }
        }

        Ok(Self::from_names(names))
    }

    /// Whether `group` is declared.
    pub fn contains(&self, group: &str) -> bool {
        self.groups.contains(&normalize_group(group))
    }

    /// The requested groups that are not declared, in request order.
    pub fn missing<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        requested
            .iter()
            .filter(|g| !self.contains(g))
            .map(String::as_str)
            .collect()
    }

    /// Declared group names, normalized and sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |value, key| value.get(*key))
}

fn table_keys(doc: &Value, path: &[&str]) -> Vec<String> {
    lookup(doc, path)
        .and_then(Value::as_table)
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default()
}
