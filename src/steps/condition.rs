//! Condition checks.
//!
//! Conditions decide whether a step's desired end state already holds,
//! which is what makes re-running a whole plan safe.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;

use crate::error::{GroundworkError, Result};
use crate::shell::execute_check;
use crate::steps::context::SystemContext;
use crate::steps::step::Condition;

/// Declarative condition, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionSpec {
    /// A file or directory exists.
    FileExists {
        /// Path to check (`~` expanded, relative to the config file)
        path: String,
    },

    /// An executable resolves on `PATH`.
    CommandExists {
        /// Executable name
        name: String,
    },

    /// A shell command exits 0.
    CommandSucceeds {
        /// Command to run
        command: String,
    },

    /// A text file contains the given line.
    LineInFile {
        /// File to search
        path: String,
        /// Line to look for (trailing whitespace ignored)
        line: String,
    },

    /// An environment variable is set (optionally to a value).
    EnvVar {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// All checks must pass.
    All { checks: Vec<ConditionSpec> },

    /// Any check passing is sufficient.
    Any { checks: Vec<ConditionSpec> },

    /// The inner check must not pass.
    Not { check: Box<ConditionSpec> },
}

impl Condition for ConditionSpec {
    fn check(&self, ctx: &SystemContext) -> Result<bool> {
        match self {
            ConditionSpec::FileExists { path } => check_file_exists(path, ctx),
            ConditionSpec::CommandExists { name } => Ok(check_command_exists(name, ctx)),
            ConditionSpec::CommandSucceeds { command } => check_command_succeeds(command, ctx),
            ConditionSpec::LineInFile { path, line } => check_line_in_file(path, line, ctx),
            ConditionSpec::EnvVar { name, value } => Ok(match ctx.lookup_env(name) {
                Some(actual) => value.as_ref().is_none_or(|v| *v == actual),
                None => false,
            }),
            ConditionSpec::All { checks } => {
                for check in checks {
                    if !check.check(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionSpec::Any { checks } => {
                for check in checks {
                    if check.check(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionSpec::Not { check } => Ok(!check.check(ctx)?),
        }
    }

    fn describe(&self) -> String {
        match self {
            ConditionSpec::FileExists { path } => format!("file exists: {}", path),
            ConditionSpec::CommandExists { name } => format!("command on PATH: {}", name),
            ConditionSpec::CommandSucceeds { command } => {
                format!("command succeeds: {}", truncate(command, 50))
            }
            ConditionSpec::LineInFile { path, line } => {
                format!("line in {}: {}", path, truncate(line, 40))
            }
            ConditionSpec::EnvVar { name, value: None } => format!("env var set: {}", name),
            ConditionSpec::EnvVar {
                name,
                value: Some(v),
            } => format!("env var {}={}", name, v),
            ConditionSpec::All { checks } => format!("all of {} checks", checks.len()),
            ConditionSpec::Any { checks } => format!("any of {} checks", checks.len()),
            ConditionSpec::Not { check } => format!("not ({})", check.describe()),
        }
    }
}

fn check_file_exists(path: &str, ctx: &SystemContext) -> Result<bool> {
    let full_path = ctx.resolve_path(path);
    // symlink_metadata so a dangling link still counts as present
    match fs::symlink_metadata(&full_path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(GroundworkError::unevaluable(
            format!("file exists: {}", path),
            e,
        )),
    }
}

fn check_command_exists(name: &str, ctx: &SystemContext) -> bool {
    ctx.find_program(name).is_ok()
}

fn check_command_succeeds(command: &str, ctx: &SystemContext) -> Result<bool> {
    execute_check(command, &ctx.command_options()).map_err(|e| {
        GroundworkError::unevaluable(format!("command succeeds: {}", truncate(command, 50)), e)
    })
}

fn check_line_in_file(path: &str, line: &str, ctx: &SystemContext) -> Result<bool> {
    let full_path = ctx.resolve_path(path);
    let content = match fs::read_to_string(&full_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(GroundworkError::unevaluable(
                format!("line in {}", path),
                e,
            ))
        }
    };

    let wanted = line.trim_end();
    Ok(content.lines().any(|l| l.trim_end() == wanted))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Result of evaluating a condition.
///
/// The `description` field is user-visible: it appears in skip messages
/// (e.g., "skipped (command on PATH: zsh)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Whether the desired state already holds.
    pub satisfied: bool,

    /// Description of what was checked.
    pub description: String,
}

impl CheckResult {
    /// Create a satisfied result.
    pub fn satisfied(description: impl Into<String>) -> Self {
        Self {
            satisfied: true,
            description: description.into(),
        }
    }

    /// Create an unsatisfied result.
    pub fn unsatisfied(description: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            description: description.into(),
        }
    }
}

/// Evaluates conditions against a [`SystemContext`].
pub struct ConditionChecker<'a> {
    ctx: &'a SystemContext,
}

impl<'a> ConditionChecker<'a> {
    pub fn new(ctx: &'a SystemContext) -> Self {
        Self { ctx }
    }

    /// Evaluate a condition, attaching its description to the result.
    pub fn evaluate(&self, condition: &dyn Condition) -> Result<CheckResult> {
        let description = condition.describe();
        let satisfied = condition.check(self.ctx)?;
        tracing::debug!(check = %description, satisfied, "condition evaluated");

        Ok(if satisfied {
            CheckResult::satisfied(description)
        } else {
            CheckResult::unsatisfied(description)
        })
    }
}
