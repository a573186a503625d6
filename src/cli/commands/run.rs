//! Run command implementation.
//!
//! The `groundwork run` command (and the bare `groundwork` invocation)
//! plans the configured steps and either applies or previews them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::runner::{Plan, Planner, RunMode, RunProgress, RunReport};
use crate::steps::{format_duration, Action as _, StepOutcome, StepRegistry, StepResult};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::workspace::Workspace;
use super::{EXIT_CONFIG_ERROR, EXIT_STEP_FAILED};

/// The run command implementation.
pub struct RunCommand {
    cwd: PathBuf,
    config: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(cwd: &Path, config: Option<&Path>, args: RunArgs) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            config: config.map(Path::to_path_buf),
            args,
        }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn mode(&self) -> RunMode {
        if self.args.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Execute
        }
    }

    fn build_plan<'r>(&self, planner: &Planner<'_>, registry: &'r StepRegistry) -> Result<Plan<'r>> {
        let plan = planner.plan(registry)?;
        if self.args.only.is_empty() {
            Ok(plan)
        } else {
            plan.restrict_to(&self.args.only)
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ws = match Workspace::load(&self.cwd, self.config.as_deref()) {
            Ok(ws) => ws,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(EXIT_CONFIG_ERROR));
            }
        };

        let planner = Planner::new(&ws.ctx);
        let plan = match self.build_plan(&planner, &ws.registry) {
            Ok(plan) => plan,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(EXIT_CONFIG_ERROR));
            }
        };

        let mode = self.mode();
        let step_label = if plan.len() == 1 { "step" } else { "steps" };
        let title = match mode {
            RunMode::DryRun => format!("Dry run · {} {}", plan.len(), step_label),
            RunMode::Execute => format!("Provisioning · {} {}", plan.len(), step_label),
        };
        if ui.output_mode().shows_steps() {
            ui.show_header(&title);
        }

        let started = Instant::now();
        let report = planner.apply_with_progress(&plan, mode, |event| {
            if let RunProgress::StepFinished { result } = event {
                show_result(ui, &ws.registry, result);
            }
        });

        show_summary(ui, &report, started);

        if let Some(failed) = report.first_failure() {
            ui.error(&format!("Step '{}' failed", failed.id));
            return Ok(CommandResult::failure(EXIT_STEP_FAILED));
        }
        Ok(CommandResult::success())
    }
}

fn show_result(ui: &mut dyn UserInterface, registry: &StepRegistry, result: &StepResult) {
    let mode = ui.output_mode();

    match &result.outcome {
        StepOutcome::Failed(e) => ui.error(&format!("{}: {}", result.id, e)),
        _ if !mode.shows_steps() => {}
        StepOutcome::Applied => {
            ui.success(&format!("{} ({})", result.id, format_duration(result.duration)))
        }
        StepOutcome::Skipped => match (&result.check, mode.shows_detail()) {
            (Some(check), true) => {
                ui.skipped(&format!("{} (already done: {})", result.id, check.description))
            }
            _ => ui.skipped(&format!("{} (already done)", result.id)),
        },
        StepOutcome::WouldApply => {
            let action = registry
                .get(&result.id)
                .map(|step| step.action().describe())
                .unwrap_or_default();
            ui.message(&format!("→ {} would run: {}", result.id, action));
        }
    }
}

fn show_summary(ui: &mut dyn UserInterface, report: &RunReport, started: Instant) {
    let elapsed = format_duration(started.elapsed());

    match report.mode {
        RunMode::DryRun => ui.message(&format!(
            "\nDry run: {} would run, {} already done{} ({})",
            report.would_apply(),
            report.skipped(),
            failed_suffix(report),
            elapsed
        )),
        RunMode::Execute if report.success() => ui.success(&format!(
            "Done: {} applied, {} already done ({})",
            report.applied(),
            report.skipped(),
            elapsed
        )),
        RunMode::Execute => ui.warning(&format!(
            "Stopped: {} applied, {} already done{} ({})",
            report.applied(),
            report.skipped(),
            failed_suffix(report),
            elapsed
        )),
    }
}

fn failed_suffix(report: &RunReport) -> String {
    match report.failed() {
        0 => String::new(),
        n => format!(", {} failed", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::ui::{MockUI, OutputMode};

    fn setup(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("groundwork.yml"), config).unwrap();
        temp
    }

    const TWO_MARKERS: &str = r#"
steps:
  - id: first
    condition: { type: file_exists, path: first.txt }
    action: { type: shell, command: "touch first.txt" }
  - id: second
    depends_on: [first]
    condition: { type: file_exists, path: second.txt }
    action: { type: shell, command: "touch second.txt" }
"#;

    #[test]
    fn execute_with_no_config_returns_exit_2() {
        let temp = TempDir::new().unwrap();
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn execute_applies_then_skips() {
        let temp = setup(TWO_MARKERS);
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());

        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(temp.path().join("first.txt").exists());
        assert!(temp.path().join("second.txt").exists());
        assert_eq!(ui.successes().len(), 3);

        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert!(result.success);
        assert_eq!(ui.skipped_lines().len(), 2);
        assert!(ui.successes()[0].contains("0 applied, 2 already done"));
    }

    #[test]
    fn dry_run_changes_nothing() {
        let temp = setup(TWO_MARKERS);
        let args = RunArgs {
            dry_run: true,
            ..Default::default()
        };
        let cmd = RunCommand::new(temp.path(), None, args);
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(!temp.path().join("first.txt").exists());
        assert!(ui.has_text("first would run: run `touch first.txt`"));
        assert!(ui.has_text("2 would run, 0 already done"));
    }

    #[test]
    fn failing_step_returns_exit_1_and_names_step() {
        let temp = setup(
            r#"
steps:
  - id: broken
    condition: { type: file_exists, path: never }
    action: { type: shell, command: "exit 3" }
  - id: after
    depends_on: [broken]
    condition: { type: file_exists, path: after.txt }
    action: { type: shell, command: "touch after.txt" }
"#,
        );
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.errors().iter().any(|e| e == "Step 'broken' failed"));
        assert!(!temp.path().join("after.txt").exists());
    }

    #[test]
    fn only_runs_target_and_dependencies() {
        let temp = setup(
            r#"
steps:
  - id: base
    condition: { type: file_exists, path: base.txt }
    action: { type: shell, command: "touch base.txt" }
  - id: target
    depends_on: [base]
    condition: { type: file_exists, path: target.txt }
    action: { type: shell, command: "touch target.txt" }
  - id: unrelated
    condition: { type: file_exists, path: unrelated.txt }
    action: { type: shell, command: "touch unrelated.txt" }
"#,
        );
        let args = RunArgs {
            only: vec!["target".into()],
            ..Default::default()
        };
        let cmd = RunCommand::new(temp.path(), None, args);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(temp.path().join("base.txt").exists());
        assert!(temp.path().join("target.txt").exists());
        assert!(!temp.path().join("unrelated.txt").exists());
    }

    #[test]
    fn cycle_returns_exit_2_without_running() {
        let temp = setup(
            r#"
steps:
  - id: a
    depends_on: [b]
    condition: { type: file_exists, path: a.txt }
    action: { type: shell, command: "touch a.txt" }
  - id: b
    depends_on: [a]
    condition: { type: file_exists, path: b.txt }
    action: { type: shell, command: "touch b.txt" }
"#,
        );
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(!temp.path().join("a.txt").exists());
        assert!(!temp.path().join("b.txt").exists());
    }

    #[test]
    fn quiet_mode_hides_step_lines() {
        let temp = setup(TWO_MARKERS);
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());
        let mut ui = MockUI::with_mode(OutputMode::Quiet);

        cmd.execute(&mut ui).unwrap();

        assert!(ui.headers().is_empty());
        assert_eq!(ui.successes().len(), 1);
    }

    #[test]
    fn verbose_skip_shows_condition() {
        let temp = setup(TWO_MARKERS);
        fs::write(temp.path().join("first.txt"), "").unwrap();
        let cmd = RunCommand::new(temp.path(), None, RunArgs::default());
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        cmd.execute(&mut ui).unwrap();

        assert!(ui.skipped_lines()[0].contains("already done: file exists: first.txt"));
    }
}
