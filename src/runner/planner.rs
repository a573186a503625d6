//! Planning and applying provisioning runs.
//!
//! The [`Planner`] turns a [`StepRegistry`] into a [`Plan`] (a
//! dependency-respecting order) and then walks that plan one step at a
//! time, either previewing or executing.

use std::collections::HashSet;

use crate::error::{GroundworkError, Result};
use crate::runner::dependency::DependencyGraph;
use crate::steps::{Executor, Step, StepOutcome, StepRegistry, StepResult, SystemContext};

/// How a plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Check conditions and report; never invoke an action.
    DryRun,
    /// Run every step in order, halting at the first failure.
    Execute,
}

/// Progress events emitted while a plan is applied.
#[derive(Debug)]
pub enum RunProgress<'r> {
    /// A step is about to be checked.
    StepStarting {
        id: &'r str,
        index: usize,
        total: usize,
    },
    /// A step has a result.
    StepFinished { result: &'r StepResult },
}

/// An ordered sequence of steps in which every step follows its dependencies.
#[derive(Debug)]
pub struct Plan<'r> {
    steps: Vec<&'r Step>,
}

impl<'r> Plan<'r> {
    pub fn steps(&self) -> &[&'r Step] {
        &self.steps
    }

    pub fn ids(&self) -> Vec<&'r str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Keep only `targets` and everything they transitively depend on.
    ///
    /// Relative order is preserved, so the result is still a valid plan.
    pub fn restrict_to<S: AsRef<str>>(&self, targets: &[S]) -> Result<Plan<'r>> {
        let mut wanted: HashSet<&str> = HashSet::new();
        for target in targets {
            let target = target.as_ref();
            let step = self
                .steps
                .iter()
                .find(|s| s.id() == target)
                .ok_or_else(|| GroundworkError::UnknownStep {
                    id: target.to_string(),
                })?;
            wanted.insert(step.id());
        }

        // Dependencies always come earlier, so one backwards sweep
        // reaches the whole closure.
        for step in self.steps.iter().rev() {
            if wanted.contains(step.id()) {
                wanted.extend(step.depends_on().iter().map(String::as_str));
            }
        }

        Ok(Plan {
            steps: self
                .steps
                .iter()
                .copied()
                .filter(|s| wanted.contains(s.id()))
                .collect(),
        })
    }
}

/// Results of applying a plan.
#[derive(Debug)]
pub struct RunReport {
    /// Mode the plan was applied in.
    pub mode: RunMode,

    /// One result per attempted step, in plan order.
    pub results: Vec<StepResult>,

    /// Step at which an execute run stopped, if it failed.
    pub halted_at: Option<String>,
}

impl RunReport {
    /// True when no step failed.
    pub fn success(&self) -> bool {
        !self.results.iter().any(StepResult::is_failed)
    }

    /// First failed result, if any.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.results.iter().find(|r| r.is_failed())
    }

    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Skipped))
    }

    pub fn would_apply(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::WouldApply))
    }

    pub fn failed(&self) -> usize {
        self.count(StepOutcome::is_failed)
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Orders steps and applies plans.
pub struct Planner<'a> {
    ctx: &'a SystemContext,
}

impl<'a> Planner<'a> {
    pub fn new(ctx: &'a SystemContext) -> Self {
        Self { ctx }
    }

    /// Produce a deterministic, dependency-respecting plan.
    ///
    /// Fails with `UnknownDependency` or `DependencyCycle`; in either case
    /// nothing has been checked or run.
    pub fn plan<'r>(&self, registry: &'r StepRegistry) -> Result<Plan<'r>> {
        let graph = DependencyGraph::from_registry(registry)?;
        let order = graph.topological_order()?;
        let steps: Vec<&Step> = registry.all().collect();

        let plan = Plan {
            steps: order.into_iter().map(|node| steps[node]).collect(),
        };
        tracing::debug!(steps = ?plan.ids(), "planned");
        Ok(plan)
    }

    /// Apply a plan.
    pub fn apply(&self, plan: &Plan<'_>, mode: RunMode) -> RunReport {
        self.apply_with_progress(plan, mode, |_| {})
    }

    /// Apply a plan, reporting progress as each step starts and finishes.
    pub fn apply_with_progress<F>(&self, plan: &Plan<'_>, mode: RunMode, mut on_progress: F) -> RunReport
    where
        F: FnMut(RunProgress<'_>),
    {
        let executor = Executor::new(self.ctx);
        let total = plan.len();
        let mut report = RunReport {
            mode,
            results: Vec::with_capacity(total),
            halted_at: None,
        };

        for (index, step) in plan.steps().iter().enumerate() {
            on_progress(RunProgress::StepStarting {
                id: step.id(),
                index,
                total,
            });

            let result = match mode {
                RunMode::DryRun => executor.preview(step),
                RunMode::Execute => executor.run(step),
            };
            on_progress(RunProgress::StepFinished { result: &result });

            let failed = result.is_failed();
            report.results.push(result);

            if failed && mode == RunMode::Execute {
                tracing::warn!(step = step.id(), "halting run");
                report.halted_at = Some(step.id().to_string());
                break;
            }
        }

        report
    }
}
