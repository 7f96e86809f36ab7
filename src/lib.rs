//! install-deps - synchronize a Python project's environment with its lockfile.
//!
//! The tool runs the project's package manager (uv, pdm or poetry) so the
//! environment contains exactly the locked packages of the default group plus
//! the `dev`, `docs` and `test` groups. Extraneous packages are removed.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`detection`] - Package manager and dependency group detection
//! - [`error`] - Error types and result aliases
//! - [`shell`] - External process execution
//! - [`sync`] - The dependency sync runner
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use install_deps::config::SyncConfig;
//! use install_deps::sync::SyncPlan;
//!
//! let plan = SyncPlan::resolve(std::path::Path::new("."), &SyncConfig::default());
//! assert_eq!(plan.groups.as_slice(), ["dev", "docs", "test"]);
//! ```

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod shell;
pub mod sync;
pub mod ui;

pub use error::{Result, SyncError};
