//! Integration tests for the groundwork binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("groundwork.yml"), config).unwrap();
    temp
}

fn groundwork(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("groundwork"));
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("GROUNDWORK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

const MARKERS: &str = r#"
steps:
  - id: shell_rc
    depends_on: [config_dir]
    condition: { type: line_in_file, path: conf/rc, line: "export EDITOR=vim" }
    action: { type: append_line, path: conf/rc, line: "export EDITOR=vim" }
  - id: config_dir
    description: Create the config directory
    condition: { type: file_exists, path: conf }
    action: { type: shell, command: "mkdir conf" }
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    groundwork(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("declarative machine provisioning"))
        .stdout(predicate::str::contains("--dry-run"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    groundwork(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_no_args_runs_and_second_run_skips() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(MARKERS);

    groundwork(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 2 applied, 0 already done"));
    assert_eq!(
        fs::read_to_string(temp.path().join("conf/rc"))?,
        "export EDITOR=vim\n"
    );

    groundwork(&temp)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 0 applied, 2 already done"));
    assert_eq!(
        fs::read_to_string(temp.path().join("conf/rc"))?,
        "export EDITOR=vim\n"
    );
    Ok(())
}

#[test]
fn cli_dry_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(MARKERS);

    groundwork(&temp)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("config_dir would run"))
        .stdout(predicate::str::contains("2 would run, 0 already done"));

    assert!(!temp.path().join("conf").exists());
    Ok(())
}

#[test]
fn cli_failed_step_exits_1_and_names_it() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"
steps:
  - id: doomed
    condition: { type: file_exists, path: never-there }
    action: { type: shell, command: "echo nope >&2; exit 7" }
"#,
    );

    groundwork(&temp)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Step 'doomed' failed"))
        .stderr(predicate::str::contains("nope"));
    Ok(())
}

#[test]
fn cli_missing_config_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    groundwork(&temp)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn cli_config_flag_overrides_discovery() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("box.yml"), MARKERS)?;

    groundwork(&temp)
        .args(["plan", "--config", "box.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_dir"));
    Ok(())
}

#[test]
fn cli_cycle_exits_2_and_runs_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
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

    groundwork(&temp)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Dependency cycle detected"));

    assert!(!temp.path().join("a.txt").exists());
    assert!(!temp.path().join("b.txt").exists());
    Ok(())
}

#[test]
fn cli_unknown_field_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"
steps:
  - id: a
    condition: { type: file_exists, path: a.txt }
    action: { type: shell, command: "touch a.txt" }
    retries: 3
"#,
    );

    groundwork(&temp)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("retries"));
    Ok(())
}

#[test]
fn cli_plan_lists_order() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(MARKERS);

    groundwork(&temp)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. config_dir"))
        .stdout(predicate::str::contains("2. shell_rc"));
    Ok(())
}

#[test]
fn cli_only_unknown_step_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(MARKERS);

    groundwork(&temp)
        .args(["run", "--only", "nonexistent"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown step: nonexistent"));
    Ok(())
}

#[test]
fn cli_list_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(MARKERS);

    let output = groundwork(&temp).args(["list", "--json"]).output()?;
    assert!(output.status.success());

    let steps: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(steps[0]["id"], "shell_rc");
    assert_eq!(steps[1]["description"], "Create the config directory");
    Ok(())
}

#[test]
fn cli_completions_bash() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    groundwork(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("groundwork"));
    Ok(())
}
