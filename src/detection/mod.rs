//! Project detection: which package manager a project uses and which
//! dependency groups it declares.

pub mod groups;
pub mod package_manager;

pub use groups::{normalize_group, DeclaredGroups};
pub use package_manager::{detect_tool, ToolKind};
