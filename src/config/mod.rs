//! Configuration loading and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use install_deps::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("install-deps.yml"), "groups: [dev, test]").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.groups, vec!["dev".to_string(), "test".to_string()]);
//! ```
//!
//! # Configuration File Locations
//!
//! Discovered at the project root and merged in this order:
//! 1. Project config (`install-deps.yml`)
//! 2. Local overrides (`install-deps.local.yml`)
//!
//! An explicit `--config` file replaces discovery entirely. When no file
//! exists the defaults apply: sync `dev`, `docs` and `test`.

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{load_config, load_config_value, parse_config, ConfigPaths};
pub use merger::{deep_merge, merge_configs};
pub use schema::{SyncConfig, DEFAULT_GROUPS};
