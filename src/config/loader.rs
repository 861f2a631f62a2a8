use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "hero-tour";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load() -> color_eyre::Result<AppConfig> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        debug!(?path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = parse(&content)?;
    debug!(?path, "Loaded config");
    Ok(config)
}

pub fn parse(content: &str) -> color_eyre::Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

/// Write `config` to the config file, creating the directory if needed.
///
/// Returns the path written to.
pub fn save(config: &AppConfig) -> color_eyre::Result<PathBuf> {
    let dir = config_dir()
        .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;
    fs::create_dir_all(&dir)?;

    let path = dir.join(CONFIG_FILE);
    fs::write(&path, toml::to_string_pretty(config)?)?;
    debug!(?path, "Saved config");
    Ok(path)
}
