//! Step ordering and plan execution.

pub mod dependency;
pub mod planner;

pub use dependency::DependencyGraph;
pub use planner::{Plan, Planner, RunMode, RunProgress, RunReport};
