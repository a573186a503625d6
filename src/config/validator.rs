//! Configuration validation rules.
//!
//! Serde already rejects unknown fields and missing conditions or
//! actions. These rules catch values that parse but cannot work:
//! - Step ids must be non-empty
//! - Shell commands, package lists and download targets must be non-empty
//! - Combinators must have at least one check
//! - The HTTP timeout must be positive
//!
//! Unknown dependencies and cycles are left to the registry and planner.

use crate::config::schema::{GroundworkConfig, StepConfig};
use crate::error::{GroundworkError, Result};
use crate::steps::{ActionSpec, ConditionSpec};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Step id if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn for_step(rule: &'static str, step: &StepConfig, message: String) -> Self {
        Self {
            rule,
            message,
            step: Some(step.id.clone()),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &GroundworkConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.settings.http_timeout_secs == 0 {
        errors.push(ValidationError {
            rule: "zero-timeout",
            message: "settings.http_timeout_secs must be greater than 0".to_string(),
            step: None,
        });
    }

    for (position, step) in config.steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            errors.push(ValidationError {
                rule: "empty-id",
                message: format!("Step #{} has an empty id", position + 1),
                step: None,
            });
            continue;
        }

        errors.extend(validate_action(step));
        validate_condition(step, &step.condition, "condition", &mut errors);
        if let Some(post) = &step.postcondition {
            validate_condition(step, post, "postcondition", &mut errors);
        }
    }

    errors
}

fn validate_action(step: &StepConfig) -> Option<ValidationError> {
    let problem = match &step.action {
        ActionSpec::Shell { command } if command.trim().is_empty() => "shell command is empty",
        ActionSpec::Package { packages, .. } if packages.is_empty() => "package list is empty",
        ActionSpec::Download { url, .. } if url.trim().is_empty() => "download url is empty",
        ActionSpec::Download { dest, .. } | ActionSpec::GitClone { dest, .. }
            if dest.trim().is_empty() =>
        {
            "destination is empty"
        }
        ActionSpec::GitClone { repo, .. } if repo.trim().is_empty() => "git repository is empty",
        _ => return None,
    };

    Some(ValidationError::for_step(
        "invalid-action",
        step,
        format!("Step '{}': {}", step.id, problem),
    ))
}

fn validate_condition(
    step: &StepConfig,
    condition: &ConditionSpec,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    match condition {
        ConditionSpec::All { checks } | ConditionSpec::Any { checks } => {
            if checks.is_empty() {
                errors.push(ValidationError::for_step(
                    "empty-combinator",
                    step,
                    format!("Step '{}': {} combinator has no checks", step.id, field),
                ));
            }
            for check in checks {
                validate_condition(step, check, field, errors);
            }
        }
        ConditionSpec::Not { check } => validate_condition(step, check, field, errors),
        ConditionSpec::CommandSucceeds { command } if command.trim().is_empty() => {
            errors.push(ValidationError::for_step(
                "empty-command",
                step,
                format!("Step '{}': {} command is empty", step.id, field),
            ));
        }
        _ => {}
    }
}

/// Validate and return a single error summarizing all problems.
pub fn validate(config: &GroundworkConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(GroundworkError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
