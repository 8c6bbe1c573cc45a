pub mod check;
pub mod config;
pub mod init;
pub mod run;

use anyhow::Context;
use std::path::Path;
use sunrise_core::config::{Config, Settings};

/// Load the config at `path` and resolve it into typed settings.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let config = Config::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    Settings::resolve(&config).with_context(|| format!("invalid config in {}", path.display()))
}
