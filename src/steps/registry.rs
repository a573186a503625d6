//! Step registry.
//!
//! Holds every step known to a run, in registration order. Dependencies
//! may point forward in that order; they are checked as a whole by
//! [`StepRegistry::validate`] once everything is registered.

use std::collections::HashMap;

use crate::error::{GroundworkError, Result};
use crate::steps::step::Step;

/// Ordered collection of uniquely named steps.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step.
    ///
    /// Fails with [`GroundworkError::DuplicateIdentifier`] if the id is taken.
    pub fn register(&mut self, step: Step) -> Result<()> {
        if self.index.contains_key(step.id()) {
            return Err(GroundworkError::DuplicateIdentifier {
                id: step.id().to_string(),
            });
        }

        tracing::trace!(step = step.id(), "registered");
        self.index.insert(step.id().to_string(), self.steps.len());
        self.steps.push(step);
        Ok(())
    }

    /// Check that every declared dependency names a registered step.
    pub fn validate(&self) -> Result<()> {
        for step in &self.steps {
            for dep in step.depends_on() {
                if !self.index.contains_key(dep) {
                    return Err(GroundworkError::UnknownDependency {
                        step: step.id().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// All registered steps.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted freely.
    /// Callers must not rely on its order; use the planner for that.
    pub fn all(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Look up a step by id.
    pub fn get(&self, id: &str) -> Option<&Step> {
        self.index.get(id).map(|&i| &self.steps[i])
    }

    /// Registration position of a step.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
