//! Path resolution for procflow
//!
//! # Environment Variables
//!
//! - `PROCFLOW_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/procflow`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `PROCFLOW_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/procflow` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\procflow`
//!    - macOS/Linux: `~/.config/procflow`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "PROCFLOW_CONFIG_DIR";

/// Name of the project parameter file inside the config directory
pub const PARAMS_FILE: &str = "params.toml";

/// Get the procflow config directory path
pub fn config_dir() -> Result<PathBuf> {
    // 1. Check environment variable override
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    // 2. Check XDG_CONFIG_HOME
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("procflow");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    // 3. Platform default
    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("procflow");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("procflow");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string
///
/// Unknown variables leave the string unchanged.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(expand_str(path))
}

/// Same as [`expand`], for strings that are not paths (command arguments)
pub fn expand_str(value: &str) -> String {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
