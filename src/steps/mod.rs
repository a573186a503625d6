//! Steps and how they are checked, applied and collected.
//!
//! - [`Step`] - A named condition/action pair with dependencies
//! - [`StepRegistry`] - The set of steps known to a run
//! - [`ConditionChecker`] - Idempotence gate ("already done?")
//! - [`Executor`] - Runs one step and records a [`StepResult`]
//!
//! # Example
//!
//! ```
//! use groundwork::steps::{Executor, Step, StepOutcome, SystemContext};
//!
//! let step = Step::builder("hello")
//!     .check_with("never done", |_| Ok(false))
//!     .apply_with("say hello", |_| Ok(()))
//!     .build()
//!     .unwrap();
//!
//! let ctx = SystemContext::new(".");
//! let result = Executor::new(&ctx).run(&step);
//! assert!(matches!(result.outcome, StepOutcome::Applied));
//! ```

pub mod action;
pub mod condition;
pub mod context;
pub mod executor;
pub mod registry;
pub mod step;

pub use action::{ActionSpec, PackageManager};
pub use condition::{CheckResult, ConditionChecker, ConditionSpec};
pub use context::SystemContext;
pub use executor::{format_duration, Executor, StepOutcome, StepResult};
pub use registry::StepRegistry;
pub use step::{Action, Condition, Step, StepBuilder};
