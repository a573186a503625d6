//! Error types for groundwork operations.
//!
//! This module defines [`GroundworkError`], the primary error type used
//! throughout the engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Registry, config and plan errors are fatal: nothing has run yet
//! - Step-level failures are recorded in the run report, not returned as `Err`
//! - Action implementations return `anyhow::Error` so the cause chain survives

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for groundwork operations.
#[derive(Debug, Error)]
pub enum GroundworkError {
    /// A step with this identifier was already registered.
    #[error("Duplicate step identifier: {id}")]
    DuplicateIdentifier { id: String },

    /// A step depends on an identifier that was never registered.
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// A step named on the command line does not exist.
    #[error("Unknown step: {id}")]
    UnknownStep { id: String },

    /// The dependency graph contains a cycle.
    #[error("Dependency cycle detected: {}", .identifiers.join(" -> "))]
    DependencyCycle { identifiers: Vec<String> },

    /// A condition could not be evaluated at all (distinct from "false").
    #[error("Condition '{check}' could not be evaluated: {message}")]
    ConditionUnevaluable { check: String, message: String },

    /// A step action failed.
    #[error("Step '{step}' failed: {cause:#}")]
    ActionError { step: String, cause: anyhow::Error },

    /// The action ran but its postcondition does not hold.
    #[error("Step '{step}' ran but postcondition '{check}' does not hold")]
    PostconditionNotMet { step: String, check: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GroundworkError {
    /// Shorthand for an unevaluable condition.
    pub fn unevaluable(check: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ConditionUnevaluable {
            check: check.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for groundwork operations.
pub type Result<T> = std::result::Result<T, GroundworkError>;
