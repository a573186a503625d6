//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, returning the exit status to report.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    cwd: PathBuf,
    config_override: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher resolving config relative to `cwd`.
    pub fn new(cwd: PathBuf, config_override: Option<PathBuf>) -> Self {
        Self {
            cwd,
            config_override,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.config_override.as_deref();
        match &cli.command {
            Some(Commands::Run(args)) => {
                let args = merge_run_args(&cli.run, args);
                super::run::RunCommand::new(&self.cwd, config, args).execute(ui)
            }
            Some(Commands::Plan(args)) => {
                super::plan::PlanCommand::new(&self.cwd, config, args.clone()).execute(ui)
            }
            Some(Commands::List(args)) => {
                super::list::ListCommand::new(&self.cwd, config, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::run::RunCommand::new(&self.cwd, config, cli.run.clone()).execute(ui),
        }
    }
}

/// Run flags given before the `run` subcommand apply to it as well.
fn merge_run_args(root: &RunArgs, sub: &RunArgs) -> RunArgs {
    let mut merged = sub.clone();
    merged.dry_run |= root.dry_run;
    for id in &root.only {
        if !merged.only.contains(id) {
            merged.only.push(id.clone());
        }
    }
    merged
}
