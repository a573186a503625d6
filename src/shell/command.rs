//! Shell command execution.

use crate::error::{GroundworkError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Shell executable (defaults to [`default_shell`]).
    pub shell: Option<PathBuf>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Execute a shell command through `<shell> -c`.
///
/// Returns `Err` only when the shell itself could not be started. A
/// non-zero exit is reported through [`CommandResult::success`].
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let shell = options.shell.clone().unwrap_or_else(default_shell);

    let mut cmd = Command::new(&shell);
    cmd.arg("-c");
    cmd.arg(command);
    cmd.stdin(Stdio::null());

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdout(if options.capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if options.capture_stderr {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    tracing::debug!(shell = %shell.display(), command, "executing");

    let output = cmd.output().map_err(|e| {
        tracing::debug!(error = %e, "failed to spawn {}", shell.display());
        GroundworkError::CommandFailed {
            command: command.to_string(),
            code: None,
        }
    })?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Execute a command quietly and report whether it exited 0.
///
/// Unlike the exit status, a spawn failure is an error: the caller
/// cannot tell "false" from "could not ask".
pub fn execute_check(command: &str, options: &CommandOptions) -> Result<bool> {
    let options = CommandOptions {
        capture_stdout: true,
        capture_stderr: true,
        ..options.clone()
    };

    execute(command, &options).map(|r| r.success)
}

/// The shell used when none is configured.
pub fn default_shell() -> PathBuf {
    PathBuf::from("/bin/sh")
}

/// Resolve `path` against `cwd` unless it is already absolute.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> CommandOptions {
        CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_captures_stderr() {
        let result = execute("echo oops >&2; exit 1", &captured()).unwrap();
        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn execute_with_env() {
        let mut options = captured();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("echo $MY_VAR", &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("here.txt"), "").unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..captured()
        };

        let result = execute("test -f here.txt", &options).unwrap();

        assert!(result.success);
    }

    #[test]
    fn execute_with_missing_shell_is_error() {
        let options = CommandOptions {
            shell: Some(PathBuf::from("/nonexistent/shell")),
            ..captured()
        };

        let err = execute("true", &options).unwrap_err();
        assert!(matches!(err, GroundworkError::CommandFailed { code: None, .. }));
    }

    #[test]
    fn execute_check_returns_bool() {
        let options = CommandOptions::default();
        assert!(execute_check("exit 0", &options).unwrap());
        assert!(!execute_check("exit 1", &options).unwrap());
    }

    #[test]
    fn absolutize_keeps_absolute_paths() {
        let p = absolutize(Path::new("/etc/hosts"), Path::new("/tmp"));
        assert_eq!(p, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn absolutize_joins_relative_paths() {
        let p = absolutize(Path::new("bin/tool"), Path::new("/opt"));
        assert_eq!(p, PathBuf::from("/opt/bin/tool"));
    }
}
