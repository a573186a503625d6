//! Turning a parsed config into engine types.

use std::path::Path;
use std::time::Duration;

use crate::config::schema::GroundworkConfig;
use crate::config::validator::validate;
use crate::error::Result;
use crate::steps::{Step, StepRegistry, SystemContext};

/// Validate `config` and register its steps in file order.
///
/// Fails on validation errors or duplicate ids. Dependencies are checked
/// later, when the registry is planned.
pub fn build_registry(config: &GroundworkConfig) -> Result<StepRegistry> {
    validate(config)?;

    let mut registry = StepRegistry::new();
    for step_config in &config.steps {
        let mut builder = Step::builder(step_config.id.as_str())
            .depends_on_all(step_config.depends_on.iter().cloned())
            .condition(step_config.condition.clone())
            .action(step_config.action.clone());

        if let Some(description) = &step_config.description {
            builder = builder.description(description.as_str());
        }
        if let Some(post) = &step_config.postcondition {
            builder = builder.postcondition(post.clone());
        }

        registry.register(builder.build()?)?;
    }

    tracing::debug!(steps = registry.len(), "registry built");
    Ok(registry)
}

/// Build the system context for a config loaded from `config_path`.
///
/// Relative paths in steps resolve against the config file's directory.
pub fn system_context(config: &GroundworkConfig, config_path: &Path) -> SystemContext {
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    SystemContext::new(base_dir)
        .with_env(config.settings.env.clone())
        .with_shell(config.settings.shell.clone())
        .with_http_timeout(Duration::from_secs(config.settings.http_timeout_secs))
}
