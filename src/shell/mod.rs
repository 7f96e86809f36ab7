//! External process execution and environment queries.

pub mod command;
pub mod platform;

pub use command::{
    execute, execute_streaming, CommandResult, CommandSpec, OutputCallback, OutputLine,
};
pub use platform::{find_on_path, is_ci};
