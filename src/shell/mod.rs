//! Shell command execution.

pub mod command;
pub mod platform;

pub use command::{absolutize, default_shell, execute, execute_check, CommandOptions, CommandResult};
pub use platform::is_elevated;
