use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use sunrise_core::config::{Config, WarnLevel};

use super::load_settings;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Show the resolved settings
    Show,
}

pub fn run(config_path: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(config_path, json),
        ConfigSubcommand::Show => show(config_path, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let warnings = config.validate();
    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    if json {
        print_json(&serde_json::json!({
            "config": config_path,
            "valid": !has_errors,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("{}: ok", config_path.display());
    } else {
        for w in &warnings {
            let label = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{label}: {}", w.message);
        }
    }

    if has_errors {
        anyhow::bail!("{} has configuration errors", config_path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;

    if json {
        print_json(&settings)?;
        return Ok(());
    }

    let mut fields = vec![
        ("config", config_path.display().to_string()),
        ("log", settings.log_path.display().to_string()),
        ("trigger", settings.trigger.clone()),
        ("interval", format!("{}s", settings.check_interval.as_secs())),
        ("wake", settings.wake.to_string()),
        ("wake wait", format!("{}s", settings.wake_wait.as_secs())),
    ];
    match &settings.restart {
        Some(restart) => {
            fields.push(("stop", restart.stop.to_string()));
            fields.push(("start", restart.start.to_string()));
        }
        None => fields.push(("restart", "disabled".into())),
    }
    print_fields(&fields);
    Ok(())
}
