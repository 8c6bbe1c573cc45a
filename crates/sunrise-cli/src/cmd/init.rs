use anyhow::Context;
use std::path::Path;
use sunrise_core::config::EXAMPLE_CONFIG;
use sunrise_core::io::write_config;

pub fn run(config_path: &Path, force: bool) -> anyhow::Result<()> {
    write_config(config_path, EXAMPLE_CONFIG, force)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    println!("Wrote example config to {}", config_path.display());
    println!("Edit log_path, trigger and wake_command, then run: sunrise config validate");
    Ok(())
}
