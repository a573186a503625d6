//! Shared config loading for commands.

use std::path::{Path, PathBuf};

use crate::config::{build_registry, load_config, system_context, GroundworkConfig};
use crate::error::Result;
use crate::steps::{StepRegistry, SystemContext};

/// Everything a command needs from the config file.
#[derive(Debug)]
pub struct Workspace {
    /// File the config was read from
    pub config_path: PathBuf,
    /// Parsed config
    pub config: GroundworkConfig,
    /// Registered steps
    pub registry: StepRegistry,
    /// Context for conditions and actions
    pub ctx: SystemContext,
}

impl Workspace {
    /// Discover (or use `config_override`), parse, validate and register.
    pub fn load(cwd: &Path, config_override: Option<&Path>) -> Result<Self> {
        let (config, config_path) = load_config(cwd, config_override)?;
        let registry = build_registry(&config)?;
        let ctx = system_context(&config, &config_path);

        Ok(Self {
            config_path,
            config,
            registry,
            ctx,
        })
    }
}
