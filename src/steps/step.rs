//! The step data model.
//!
//! A [`Step`] pairs a side-effect-free [`Condition`] describing the desired
//! end state with an [`Action`] that produces it. Steps are assembled with
//! [`StepBuilder`] and never change after [`StepBuilder::build`].

use std::fmt;

use crate::error::{GroundworkError, Result};
use crate::steps::context::SystemContext;

/// A read-only query of system state.
///
/// Implementations must not mutate anything and must return the same answer
/// while nothing external changes. `Ok(false)` means "not satisfied";
/// `Err` means the question could not be asked.
pub trait Condition {
    /// Evaluate the condition.
    fn check(&self, ctx: &SystemContext) -> Result<bool>;

    /// Human-readable description (shown in skip and failure messages).
    fn describe(&self) -> String;
}

/// A side-effecting procedure that should make a condition true.
pub trait Action {
    /// Perform the effect.
    fn apply(&self, ctx: &SystemContext) -> anyhow::Result<()>;

    /// Human-readable description (shown in dry-run output).
    fn describe(&self) -> String;
}

/// Adapter turning a closure into a [`Condition`].
pub struct FnCondition<F> {
    description: String,
    check: F,
}

impl<F> Condition for FnCondition<F>
where
    F: Fn(&SystemContext) -> Result<bool>,
{
    fn check(&self, ctx: &SystemContext) -> Result<bool> {
        (self.check)(ctx)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Adapter turning a closure into an [`Action`].
pub struct FnAction<F> {
    description: String,
    apply: F,
}

impl<F> Action for FnAction<F>
where
    F: Fn(&SystemContext) -> anyhow::Result<()>,
{
    fn apply(&self, ctx: &SystemContext) -> anyhow::Result<()> {
        (self.apply)(ctx)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// A single named provisioning step.
pub struct Step {
    id: String,
    description: Option<String>,
    depends_on: Vec<String>,
    condition: Box<dyn Condition>,
    action: Box<dyn Action>,
    postcondition: Option<Box<dyn Condition>>,
}

impl Step {
    /// Start building a step with the given identifier.
    pub fn builder(id: impl Into<String>) -> StepBuilder {
        StepBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Description, falling back to the action's own description.
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.action.describe())
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn condition(&self) -> &dyn Condition {
        self.condition.as_ref()
    }

    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    pub fn postcondition(&self) -> Option<&dyn Condition> {
        self.postcondition.as_deref()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("depends_on", &self.depends_on)
            .field("condition", &self.condition.describe())
            .field("action", &self.action.describe())
            .field(
                "postcondition",
                &self.postcondition.as_ref().map(|c| c.describe()),
            )
            .finish()
    }
}

/// Builder for [`Step`].
pub struct StepBuilder {
    id: String,
    description: Option<String>,
    depends_on: Vec<String>,
    condition: Option<Box<dyn Condition>>,
    action: Option<Box<dyn Action>>,
    postcondition: Option<Box<dyn Condition>>,
}

impl StepBuilder {
    /// Create a new builder.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            depends_on: Vec::new(),
            condition: None,
            action: None,
            postcondition: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a dependency on another step.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Add several dependencies at once.
    pub fn depends_on_all<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn postcondition(mut self, condition: impl Condition + 'static) -> Self {
        self.postcondition = Some(Box::new(condition));
        self
    }

    /// Use a closure as the condition.
    pub fn check_with<F>(self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&SystemContext) -> Result<bool> + 'static,
    {
        self.condition(FnCondition {
            description: description.into(),
            check,
        })
    }

    /// Use a closure as the action.
    pub fn apply_with<F>(self, description: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&SystemContext) -> anyhow::Result<()> + 'static,
    {
        self.action(FnAction {
            description: description.into(),
            apply,
        })
    }

    /// Use a closure as the postcondition.
    pub fn verify_with<F>(self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&SystemContext) -> Result<bool> + 'static,
    {
        self.postcondition(FnCondition {
            description: description.into(),
            check,
        })
    }

    /// Finish the step.
    ///
    /// Fails if the identifier is blank or the condition or action is missing.
    pub fn build(self) -> Result<Step> {
        if self.id.trim().is_empty() {
            return Err(GroundworkError::ConfigValidationError {
                message: "step identifier must not be empty".to_string(),
            });
        }

        let condition = self
            .condition
            .ok_or_else(|| GroundworkError::ConfigValidationError {
                message: format!("step '{}' has no condition", self.id),
            })?;

        let action = self
            .action
            .ok_or_else(|| GroundworkError::ConfigValidationError {
                message: format!("step '{}' has no action", self.id),
            })?;

        Ok(Step {
            id: self.id,
            description: self.description,
            depends_on: self.depends_on,
            condition,
            action,
            postcondition: self.postcondition,
        })
    }
}
