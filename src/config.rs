use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_NAME: &str = ".debtclosetrc";

/// Load configuration from file or use defaults
///
/// Search order:
/// 1. Custom path if provided via --config
/// 2. .debtclosetrc in current directory
/// 3. ~/.debtclosetrc in home directory
/// 4. Built-in defaults
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    // If custom path provided, use it exclusively
    if let Some(path) = custom_path {
        return load_config_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let mut candidates = vec![PathBuf::from(CONFIG_NAME)];
    candidates.extend(get_home_config_path());

    Ok(first_readable_config(&candidates))
}

/// The first candidate that exists and parses; unreadable files are skipped
/// with a warning so a broken rc file never blocks a run.
fn first_readable_config(candidates: &[PathBuf]) -> Config {
    for path in candidates.iter().filter(|path| path.exists()) {
        match load_config_from_file(path) {
            Ok(config) => return config,
            Err(err) => {
                warn!(path = %path.display(), "ignoring unreadable config file: {:#}", err)
            }
        }
    }

    Config::default()
}

/// Load config from a specific file
fn load_config_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

fn get_home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_NAME))
}
