//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - Conversion into a [`StepRegistry`](crate::steps::StepRegistry) in [`builder`]
//!
//! # Example
//!
//! ```
//! use groundwork::config::{build_registry, parse_config};
//! use std::path::Path;
//!
//! let yaml = r#"
//! steps:
//!   - id: marker
//!     condition: { type: file_exists, path: /tmp/marker }
//!     action: { type: shell, command: "touch /tmp/marker" }
//! "#;
//!
//! let config = parse_config(yaml, Path::new("groundwork.yml")).unwrap();
//! let registry = build_registry(&config).unwrap();
//! assert_eq!(registry.len(), 1);
//! ```
//!
//! # Configuration File Locations
//!
//! Without `--config`, the first of these that exists is used:
//! 1. `./groundwork.yml`
//! 2. `~/.config/groundwork/config.yml`

pub mod builder;
pub mod loader;
pub mod schema;
pub mod validator;

pub use builder::{build_registry, system_context};
pub use loader::{discover_config, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::{GroundworkConfig, Settings, StepConfig, DEFAULT_HTTP_TIMEOUT_SECS};
pub use validator::{validate, validate_config, ValidationError};
