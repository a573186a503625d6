//! Groundwork - Idempotent, declarative machine provisioning.
//!
//! Groundwork replaces "check if X exists, if not install X" bootstrap
//! scripts with a dependency graph of named steps. Each step pairs a
//! read-only condition with an action that runs only when the condition
//! does not hold, so a whole plan can be re-run safely at any time.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Planning and applying runs
//! - [`shell`] - Shell command execution
//! - [`steps`] - Steps, conditions, actions and the executor
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use groundwork::runner::{Planner, RunMode};
//! use groundwork::steps::{Step, StepRegistry, SystemContext};
//!
//! let mut registry = StepRegistry::new();
//! registry
//!     .register(
//!         Step::builder("greet")
//!             .depends_on("prepare")
//!             .check_with("never", |_| Ok(false))
//!             .apply_with("say hi", |_| Ok(()))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//! registry
//!     .register(
//!         Step::builder("prepare")
//!             .check_with("already prepared", |_| Ok(true))
//!             .apply_with("prepare", |_| Ok(()))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let ctx = SystemContext::new(".");
//! let planner = Planner::new(&ctx);
//! let plan = planner.plan(&registry).unwrap();
//! assert_eq!(plan.ids(), vec!["prepare", "greet"]);
//!
//! let report = planner.apply(&plan, RunMode::Execute);
//! assert!(report.success());
//! assert_eq!(report.skipped(), 1);
//! assert_eq!(report.applied(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{GroundworkError, Result};
