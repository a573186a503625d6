//! Configuration schema types.
//!
//! A config file is a `settings` block plus an ordered `steps` list:
//!
//! ```yaml
//! settings:
//!   env:
//!     DEBIAN_FRONTEND: noninteractive
//!   http_timeout_secs: 30
//!
//! steps:
//!   - id: zsh
//!     condition: { type: command_exists, name: zsh }
//!     action: { type: package, manager: apt, packages: [zsh] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::steps::{ActionSpec, ConditionSpec};

/// Default HTTP timeout for download actions, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroundworkConfig {
    /// Global settings
    pub settings: Settings,

    /// Steps in registration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,
}

/// Global settings applied to every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Extra environment variables for commands and env checks
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Shell used for `shell` actions and `command_succeeds` checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<PathBuf>,

    /// Timeout for `download` actions
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: HashMap::new(),
            shell: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// One step as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Unique identifier
    pub id: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps that must be applied first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Holds when the step's work is already done
    pub condition: ConditionSpec,

    /// Work to perform when the condition does not hold
    pub action: ActionSpec,

    /// Must hold after the action has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcondition: Option<ConditionSpec>,
}
