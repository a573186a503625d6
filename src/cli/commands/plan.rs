//! Plan command implementation.
//!
//! The `groundwork plan` command prints the execution order. It never
//! evaluates a condition.

use std::path::{Path, PathBuf};

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::Planner;
use crate::ui::{Theme, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;
use super::EXIT_CONFIG_ERROR;

/// The plan command implementation.
pub struct PlanCommand {
    cwd: PathBuf,
    config: Option<PathBuf>,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(cwd: &Path, config: Option<&Path>, args: PlanArgs) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    fn render(&self, ws: &Workspace, ui: &mut dyn UserInterface) -> Result<()> {
        let planner = Planner::new(&ws.ctx);
        let mut plan = planner.plan(&ws.registry)?;
        if !self.args.only.is_empty() {
            plan = plan.restrict_to(&self.args.only)?;
        }

        let theme = Theme::detect();
        let width = plan.len().to_string().len();
        for (index, step) in plan.steps().iter().enumerate() {
            let mut line = format!(
                "{:>width$}. {}  {}",
                index + 1,
                theme.step_id.apply_to(step.id()),
                theme.dim.apply_to(step.description()),
                width = width
            );
            if !step.depends_on().is_empty() {
                line.push_str(&format!(
                    "  {}",
                    theme
                        .dim
                        .apply_to(format!("(after {})", step.depends_on().join(", ")))
                ));
            }
            ui.output(&line);
        }
        Ok(())
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let result = Workspace::load(&self.cwd, self.config.as_deref())
            .and_then(|ws| self.render(&ws, ui));

        match result {
            Ok(()) => Ok(CommandResult::success()),
            Err(e) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(EXIT_CONFIG_ERROR))
            }
        }
    }
}
