//! The explicit handle on the machine being provisioned.
//!
//! Conditions query it and actions mutate it. The engine itself never
//! looks inside; it only threads a [`SystemContext`] through.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shell::{absolutize, CommandOptions};

/// Default timeout for HTTP downloads.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment shared by every condition and action in a run.
#[derive(Debug, Clone)]
pub struct SystemContext {
    base_dir: PathBuf,
    env: HashMap<String, String>,
    shell: Option<PathBuf>,
    http_timeout: Duration,
}

impl SystemContext {
    /// Create a context resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            env: HashMap::new(),
            shell: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Extra environment variables for commands and `env_var` checks.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Shell used for `shell` actions and `command_succeeds` checks.
    pub fn with_shell(mut self, shell: Option<PathBuf>) -> Self {
        self.shell = shell;
        self
    }

    /// Timeout applied to each download.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    /// Expand `~` and resolve relative paths against the base dir.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let expanded = shellexpand::tilde(raw);
        absolutize(Path::new(expanded.as_ref()), &self.base_dir)
    }

    /// Look up a variable, preferring configured values over the process env.
    pub fn lookup_env(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Locate a program on the configured `PATH`, or the process `PATH`
    /// when none is configured.
    pub fn find_program(&self, name: &str) -> which::Result<PathBuf> {
        match self.env.get("PATH") {
            Some(path) => which::which_in(name, Some(path), &self.base_dir),
            None => which::which(name),
        }
    }

    /// Command options with captured output, running in the base dir.
    pub fn command_options(&self) -> CommandOptions {
        CommandOptions {
            shell: self.shell.clone(),
            cwd: Some(self.base_dir.clone()),
            env: self.env.clone(),
            capture_stdout: true,
            capture_stderr: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_joins_relative() {
        let ctx = SystemContext::new("/srv/provision");
        assert_eq!(
            ctx.resolve_path("files/zshrc"),
            PathBuf::from("/srv/provision/files/zshrc")
        );
    }

    #[test]
    fn resolve_path_keeps_absolute() {
        let ctx = SystemContext::new("/srv/provision");
        assert_eq!(ctx.resolve_path("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn resolve_path_expands_tilde() {
        let ctx = SystemContext::new("/srv/provision");
        let resolved = ctx.resolve_path("~/.zshrc");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".zshrc"));
        assert!(!resolved.to_string_lossy().contains('~'));
    }

    #[test]
    fn lookup_env_prefers_configured_values() {
        let mut env = HashMap::new();
        env.insert("PATH".to_string(), "/custom/bin".to_string());
        let ctx = SystemContext::new("/").with_env(env);
        assert_eq!(ctx.lookup_env("PATH").as_deref(), Some("/custom/bin"));
    }

    #[test]
    fn command_options_run_in_base_dir() {
        let ctx = SystemContext::new("/tmp").with_shell(Some(PathBuf::from("/bin/bash")));
        let opts = ctx.command_options();
        assert_eq!(opts.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(opts.shell, Some(PathBuf::from("/bin/bash")));
        assert!(opts.capture_stderr);
    }

    #[test]
    fn default_http_timeout() {
        let ctx = SystemContext::new("/");
        assert_eq!(ctx.http_timeout(), DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn find_program_uses_configured_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut env = HashMap::new();
        env.insert("PATH".to_string(), temp.path().display().to_string());
        let ctx = SystemContext::new(temp.path()).with_env(env);

        assert!(ctx.find_program("sh").is_err());
    }
}
