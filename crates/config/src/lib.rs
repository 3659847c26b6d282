//! Declarative command trees: loading, validation, env substitution.
//!
//! Config files: `herald.toml`, `herald.yaml`, `herald.yml`, or `herald.json`
//! Searched in `./` then `~/.config/herald/`.
//!
//! Supports `${ENV_VAR}` substitution anywhere in the file.

pub mod build;
pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    build::apply_commands,
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, parse_config},
    schema::{CommandConfig, HeraldConfig, ResponseConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
