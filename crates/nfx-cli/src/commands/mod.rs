//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use anyhow::Context;
use nfx_core::NfxConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nfx")
        .join("config.json")
}

/// The config file in effect: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<NfxConfig> {
    if let Some(path) = explicit {
        return NfxConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let path = default_config_path();
    if path.exists() {
        NfxConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    } else {
        Ok(NfxConfig::default())
    }
}
