//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].
//!
//! Exit codes are shared by every command:
//! - `0` - success (including dry runs with pending work)
//! - `1` - a step failed
//! - `2` - config, registry or plan error; nothing was attempted

pub mod completions;
pub mod dispatcher;
pub mod list;
pub mod plan;
pub mod run;
pub mod workspace;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use workspace::Workspace;

/// A step failed.
pub const EXIT_STEP_FAILED: i32 = 1;

/// Config, registry or plan error.
pub const EXIT_CONFIG_ERROR: i32 = 2;
