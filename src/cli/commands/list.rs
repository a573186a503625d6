//! List command implementation.
//!
//! The `groundwork list` command lists configured steps in file order.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::steps::Condition as _;
use crate::ui::{Theme, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;
use super::EXIT_CONFIG_ERROR;

/// The list command implementation.
pub struct ListCommand {
    cwd: PathBuf,
    config: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(cwd: &Path, config: Option<&Path>, args: ListArgs) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ws = match Workspace::load(&self.cwd, self.config.as_deref()) {
            Ok(ws) => ws,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(EXIT_CONFIG_ERROR));
            }
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&ws.config.steps)
                .map_err(anyhow::Error::from)?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        let theme = Theme::detect();
        for step in &ws.config.steps {
            ui.output(&format!("{}", theme.step_id.apply_to(&step.id)));
            if let Some(desc) = &step.description {
                ui.output(&format!("    {}", theme.dim.apply_to(desc)));
            }
            ui.output(&format!(
                "    {} {}",
                theme.dim.apply_to("when not:"),
                step.condition.describe()
            ));
            if !step.depends_on.is_empty() {
                ui.output(&format!(
                    "    {} {}",
                    theme.dim.apply_to("depends on:"),
                    step.depends_on.join(", ")
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
