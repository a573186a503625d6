//! Step execution engine.
//!
//! The [`Executor`] gates every action behind its condition and confirms
//! the postcondition afterwards. It never retries and never rolls back.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::GroundworkError;
use crate::steps::condition::{CheckResult, ConditionChecker};
use crate::steps::context::SystemContext;
use crate::steps::step::Step;

/// Outcome of attempting one step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The condition already held; the action was not invoked.
    Skipped,

    /// The action ran and the postcondition (if any) held.
    Applied,

    /// Dry-run only: the condition does not hold, so the action would run.
    WouldApply,

    /// The step could not be completed.
    ///
    /// Always one of [`GroundworkError::ActionError`],
    /// [`GroundworkError::PostconditionNotMet`] or
    /// [`GroundworkError::ConditionUnevaluable`].
    Failed(GroundworkError),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }

    /// Get a display character for this outcome.
    pub fn display_char(&self) -> char {
        match self {
            StepOutcome::Skipped => '⊘',
            StepOutcome::Applied => '✓',
            StepOutcome::WouldApply => '→',
            StepOutcome::Failed(_) => '✗',
        }
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Skipped => "skipped",
            StepOutcome::Applied => "applied",
            StepOutcome::WouldApply => "would apply",
            StepOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of attempting a step.
#[derive(Debug)]
pub struct StepResult {
    /// Step identifier.
    pub id: String,

    /// What happened.
    pub outcome: StepOutcome,

    /// Condition result that decided the outcome (if evaluated).
    pub check: Option<CheckResult>,

    /// Wall-clock time spent on the step.
    pub duration: Duration,
}

impl StepResult {
    fn new(step: &Step, outcome: StepOutcome, check: Option<CheckResult>, start: Instant) -> Self {
        Self {
            id: step.id().to_string(),
            outcome,
            check,
            duration: start.elapsed(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_failed()
    }

    /// The failure cause, if the step failed.
    pub fn error(&self) -> Option<&GroundworkError> {
        match &self.outcome {
            StepOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let mark = self.outcome.display_char();
        match &self.outcome {
            StepOutcome::Applied => {
                format!("{} {} ({})", mark, self.id, format_duration(self.duration))
            }
            StepOutcome::Skipped => match &self.check {
                Some(check) => format!("{} {} (already done: {})", mark, self.id, check.description),
                None => format!("{} {} (already done)", mark, self.id),
            },
            StepOutcome::WouldApply => format!("{} {} (would apply)", mark, self.id),
            StepOutcome::Failed(e) => format!("{} {} - {}", mark, self.id, e),
        }
    }
}

/// Format a duration compactly ("340ms", "2.1s", "3m 5s").
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Runs single steps against a [`SystemContext`].
pub struct Executor<'a> {
    ctx: &'a SystemContext,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a SystemContext) -> Self {
        Self { ctx }
    }

    /// Attempt a step: skip if done, otherwise apply and verify.
    pub fn run(&self, step: &Step) -> StepResult {
        let start = Instant::now();
        let checker = ConditionChecker::new(self.ctx);

        let check = match checker.evaluate(step.condition()) {
            Ok(check) => check,
            Err(e) => {
                tracing::warn!(step = step.id(), error = %e, "condition unevaluable");
                return StepResult::new(step, StepOutcome::Failed(e), None, start);
            }
        };

        if check.satisfied {
            tracing::info!(step = step.id(), check = %check.description, "already satisfied");
            return StepResult::new(step, StepOutcome::Skipped, Some(check), start);
        }

        tracing::info!(step = step.id(), action = %step.action().describe(), "applying");

        if let Err(cause) = step.action().apply(self.ctx) {
            tracing::warn!(step = step.id(), error = %format!("{:#}", cause), "action failed");
            let error = GroundworkError::ActionError {
                step: step.id().to_string(),
                cause,
            };
            return StepResult::new(step, StepOutcome::Failed(error), Some(check), start);
        }

        if let Some(post) = step.postcondition() {
            match checker.evaluate(post) {
                Ok(verified) if verified.satisfied => {}
                Ok(verified) => {
                    tracing::warn!(step = step.id(), check = %verified.description, "postcondition not met");
                    let error = GroundworkError::PostconditionNotMet {
                        step: step.id().to_string(),
                        check: verified.description,
                    };
                    return StepResult::new(step, StepOutcome::Failed(error), Some(check), start);
                }
                Err(e) => {
                    tracing::warn!(step = step.id(), error = %e, "postcondition unevaluable");
                    return StepResult::new(step, StepOutcome::Failed(e), Some(check), start);
                }
            }
        }

        tracing::info!(step = step.id(), "applied");
        StepResult::new(step, StepOutcome::Applied, Some(check), start)
    }

    /// Evaluate a step's condition without acting on it.
    pub fn preview(&self, step: &Step) -> StepResult {
        let start = Instant::now();
        let checker = ConditionChecker::new(self.ctx);

        match checker.evaluate(step.condition()) {
            Ok(check) if check.satisfied => {
                StepResult::new(step, StepOutcome::Skipped, Some(check), start)
            }
            Ok(check) => StepResult::new(step, StepOutcome::WouldApply, Some(check), start),
            Err(e) => StepResult::new(step, StepOutcome::Failed(e), None, start),
        }
    }
}
