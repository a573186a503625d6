//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::GroundworkConfig;
use crate::error::{GroundworkError, Result};

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "groundwork.yml";

/// User-level config, relative to the home directory.
const USER_CONFIG_PATH: &str = "~/.config/groundwork/config.yml";

/// Find the config file to use, starting from `cwd`.
///
/// Checks `./groundwork.yml` first, then `~/.config/groundwork/config.yml`.
pub fn discover_config(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = PathBuf::from(shellexpand::tilde(USER_CONFIG_PATH).as_ref());
    if user.is_file() {
        Some(user)
    } else {
        None
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<GroundworkConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GroundworkError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            GroundworkError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a config.
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<GroundworkConfig> {
    if content.trim().is_empty() {
        return Ok(GroundworkConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| GroundworkError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the config named by `config_override`, or the discovered one.
///
/// Returns the config together with the path it was read from.
pub fn load_config(
    cwd: &Path,
    config_override: Option<&Path>,
) -> Result<(GroundworkConfig, PathBuf)> {
    let path = match config_override {
        Some(path) => path.to_path_buf(),
        None => discover_config(cwd).ok_or_else(|| GroundworkError::ConfigNotFound {
            path: cwd.join(CONFIG_FILE_NAME),
        })?,
    };

    tracing::debug!(path = %path.display(), "loading config");
    let config = load_config_file(&path)?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
steps:
  - id: hello
    condition: { type: file_exists, path: hello.txt }
    action: { type: shell, command: "touch hello.txt" }
"#;

    #[test]
    fn discover_finds_local_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), MINIMAL).unwrap();

        let found = discover_config(temp.path()).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn discover_ignores_directory_named_like_config() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(CONFIG_FILE_NAME)).unwrap();

        let found = discover_config(temp.path());
        assert_ne!(found, Some(temp.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, MINIMAL).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].id, "hello");
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/groundwork.yml"));
        assert!(matches!(result, Err(GroundworkError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("steps: [", Path::new("test.yml"));
        assert!(matches!(result, Err(GroundworkError::ConfigParseError { .. })));
    }

    #[test]
    fn parse_config_reports_unknown_condition_type() {
        let yaml = r#"
steps:
  - id: x
    condition: { type: file_missing, path: a }
    action: { type: shell, command: "true" }
"#;
        let err = parse_config(yaml, Path::new("groundwork.yml")).unwrap_err();
        assert!(err.to_string().contains("file_missing"));
    }

    #[test]
    fn parse_config_handles_empty_file() {
        let config = parse_config("", Path::new("groundwork.yml")).unwrap();
        assert!(config.steps.is_empty());
        assert_eq!(config.settings.http_timeout_secs, 60);
    }

    #[test]
    fn load_config_with_override_uses_that_file() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, MINIMAL).unwrap();

        let (config, path) = load_config(temp.path(), Some(&custom)).unwrap();
        assert_eq!(path, custom);
        assert_eq!(config.steps.len(), 1);
    }

    #[test]
    fn load_config_with_missing_override_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yml");

        let result = load_config(temp.path(), Some(&missing));
        assert!(matches!(result, Err(GroundworkError::ConfigNotFound { .. })));
    }
}
