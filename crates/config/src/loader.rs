use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::HeraldConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["herald.toml", "herald.yaml", "herald.yml", "herald.json"];

/// Load a command tree file (any supported format).
pub fn load_config(path: &Path) -> Result<HeraldConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&substitute_env(&raw), path)
}

/// Parse raw file text, picking the format from the file extension.
pub fn parse_config(raw: &str, path: &Path) -> Result<HeraldConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            ext: ext.to_string(),
        }),
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./herald.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/herald/herald.{toml,yaml,yml,json}` (user-global)
///
/// Returns `HeraldConfig::default()` only when no file exists; a file that
/// fails to load is an error.
pub fn discover_and_load() -> Result<HeraldConfig> {
    load_discovered(find_config_file())
}

fn load_discovered(found: Option<PathBuf>) -> Result<HeraldConfig> {
    match found {
        Some(path) => {
            debug!(path = %path.display(), "loading command config");
            load_config(&path).map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to load command config");
                e
            })
        },
        None => {
            debug!("no command config found, using defaults");
            Ok(HeraldConfig::default())
        },
    }
}

/// First config file in the standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/herald/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "herald").map(|d| d.config_dir().to_path_buf())
}
