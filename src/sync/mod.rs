//! The dependency sync runner.
//!
//! A sync makes the target environment match the project's lockfile for the
//! default group plus the requested groups: missing packages are installed
//! and extraneous ones removed. The package manager does the work; this
//! module decides what to ask for, checks the request against the project's
//! declared groups, and turns the outcome into a [`SyncError`] variant.
//!
//! - [`plan`] - group sets and the resolved tool invocation
//! - [`manager`] - the [`PackageManager`] capability and its process-backed
//!   implementation
//! - [`patterns`] - failure classification from tool diagnostics
//! - [`runner`] - [`DependencySyncRunner`]
//!
//! [`SyncError`]: crate::error::SyncError

pub mod manager;
pub mod patterns;
pub mod plan;
pub mod runner;

pub use manager::{passthrough, OutputSink, PackageManager, ProcessManager, SyncStatus};
pub use patterns::classify_failure;
pub use plan::{GroupSet, SyncPlan, ToolInvocation};
pub use runner::{install_dependencies, DependencySyncRunner};
