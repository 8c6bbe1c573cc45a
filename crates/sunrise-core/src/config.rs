use crate::command::CommandSpec;
use crate::error::{Result, SunriseError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (raw file contents)
// ---------------------------------------------------------------------------

/// The config file as written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seconds between log checks.
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Path to the Sunshine log.
    pub log_path: PathBuf,
    /// Text that marks a log line as "the display is missing".
    pub trigger: String,
    /// Seconds to wait after the wake command before restarting anything.
    #[serde(default = "default_wake_wait")]
    pub wake_wait_seconds: u64,
    pub wake_command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,
    #[serde(default)]
    pub restart_enabled: bool,
}

fn default_check_interval() -> u64 {
    5
}

fn default_wake_wait() -> u64 {
    5
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SunriseError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// Check for mistakes that `Settings::resolve` would reject, plus ones it
    /// would accept but that are probably not what the user meant.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.check_interval_seconds == 0 {
            warnings.push(ConfigWarning::error("check_interval_seconds must be greater than 0"));
        }
        if self.trigger.is_empty() {
            warnings.push(ConfigWarning::error(
                "trigger is empty; every log line would match",
            ));
        }
        if self.log_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning::error("log_path is empty"));
        }

        warnings.extend(check_command("wake_command", &self.wake_command));
        for (key, value) in [
            ("stop_command", &self.stop_command),
            ("start_command", &self.start_command),
        ] {
            match value {
                Some(line) => warnings.extend(check_command(key, line)),
                None if self.restart_enabled => warnings.push(ConfigWarning::error(format!(
                    "{key} is required when restart_enabled is true"
                ))),
                None => {}
            }
        }

        if !self.restart_enabled && (self.stop_command.is_some() || self.start_command.is_some()) {
            warnings.push(ConfigWarning::warning(
                "stop_command/start_command are set but restart_enabled is false; they will not run",
            ));
        }
        if self.restart_enabled && self.wake_wait_seconds == 0 {
            warnings.push(ConfigWarning::warning(
                "wake_wait_seconds is 0; the restart may race the display waking up",
            ));
        }

        warnings
    }
}

fn check_command(key: &str, line: &str) -> Option<ConfigWarning> {
    match CommandSpec::parse(line) {
        Ok(spec) if !spec.program.contains('/') && which::which(&spec.program).is_err() => {
            Some(ConfigWarning::warning(format!(
                "{key}: program '{}' not found on PATH",
                spec.program
            )))
        }
        Ok(_) => None,
        Err(e) => Some(ConfigWarning::error(format!("{key}: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Settings (resolved)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RestartCommands {
    pub stop: CommandSpec,
    pub start: CommandSpec,
}

/// Typed settings derived from [`Config`]. Commands are parsed here, once.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub check_interval: Duration,
    pub log_path: PathBuf,
    pub trigger: String,
    pub wake_wait: Duration,
    pub wake: CommandSpec,
    /// `None` when restarting is disabled.
    pub restart: Option<RestartCommands>,
}

impl Settings {
    pub fn resolve(config: &Config) -> Result<Self> {
        if config.check_interval_seconds == 0 {
            return Err(SunriseError::Config(
                "check_interval_seconds must be greater than 0".into(),
            ));
        }
        if config.trigger.is_empty() {
            return Err(SunriseError::Config("trigger must not be empty".into()));
        }
        if config.log_path.as_os_str().is_empty() {
            return Err(SunriseError::Config("log_path must not be empty".into()));
        }

        let wake = parse_command("wake_command", &config.wake_command)?;
        let restart = if config.restart_enabled {
            Some(RestartCommands {
                stop: parse_required("stop_command", config.stop_command.as_deref())?,
                start: parse_required("start_command", config.start_command.as_deref())?,
            })
        } else {
            None
        };

        Ok(Self {
            check_interval: Duration::from_secs(config.check_interval_seconds),
            log_path: config.log_path.clone(),
            trigger: config.trigger.clone(),
            wake_wait: Duration::from_secs(config.wake_wait_seconds),
            wake,
            restart,
        })
    }
}

fn parse_command(key: &str, line: &str) -> Result<CommandSpec> {
    CommandSpec::parse(line).map_err(|e| SunriseError::Config(format!("{key}: {e}")))
}

fn parse_required(key: &str, line: Option<&str>) -> Result<CommandSpec> {
    let line = line.ok_or_else(|| {
        SunriseError::Config(format!("{key} is required when restart_enabled is true"))
    })?;
    parse_command(key, line)
}

// ---------------------------------------------------------------------------
// Example config
// ---------------------------------------------------------------------------

/// Commented starting point written by `sunrise init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../sunrise.example.yaml");

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config::from_yaml(
            "log_path: /tmp/sunshine.log\ntrigger: display not found\nwake_command: \"true\"\n",
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let cfg = minimal();
        assert_eq!(cfg.check_interval_seconds, 5);
        assert_eq!(cfg.wake_wait_seconds, 5);
        assert!(!cfg.restart_enabled);
        assert!(cfg.stop_command.is_none());
    }

    #[test]
    fn example_config_parses_and_resolves() {
        let cfg = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        let settings = Settings::resolve(&cfg).unwrap();
        assert_eq!(settings.wake.program, "xset");
        assert_eq!(settings.check_interval, Duration::from_secs(5));
        assert!(settings.restart.is_none());
    }

    #[test]
    fn example_config_has_no_unused_restart_commands() {
        let cfg = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert!(cfg.stop_command.is_none());
        assert!(cfg.start_command.is_none());
        assert!(cfg
            .validate()
            .iter()
            .all(|w| !w.message.contains("restart_enabled")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_yaml(
            "log_path: a\ntrigger: b\nwake_command: c\nrestart_enabeld: true\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("restart_enabeld"));
    }

    #[test]
    fn missing_required_key_is_an_error() {
        assert!(Config::from_yaml("log_path: a\ntrigger: b\n").is_err());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sunrise.yaml");
        assert!(matches!(
            Config::load(&path),
            Err(SunriseError::ConfigNotFound(p)) if p == path
        ));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sunrise.yaml");
        std::fs::write(&path, EXAMPLE_CONFIG).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.trigger, "Error: Couldn't find any working display");
    }

    #[test]
    fn resolve_with_restart() {
        let mut cfg = minimal();
        cfg.restart_enabled = true;
        cfg.stop_command = Some("killall sunshine".into());
        cfg.start_command = Some("sunshine --verbose".into());
        let settings = Settings::resolve(&cfg).unwrap();
        let restart = settings.restart.unwrap();
        assert_eq!(restart.stop.args, vec!["sunshine"]);
        assert_eq!(restart.start.args, vec!["--verbose"]);
    }

    #[test]
    fn resolve_ignores_restart_commands_when_disabled() {
        let mut cfg = minimal();
        cfg.stop_command = Some("\"unbalanced".into());
        let settings = Settings::resolve(&cfg).unwrap();
        assert!(settings.restart.is_none());
    }

    #[test]
    fn resolve_requires_restart_commands_when_enabled() {
        let mut cfg = minimal();
        cfg.restart_enabled = true;
        cfg.stop_command = Some("killall sunshine".into());
        let err = Settings::resolve(&cfg).unwrap_err();
        assert!(err.to_string().contains("start_command"));
    }

    #[test]
    fn resolve_rejects_zero_interval() {
        let mut cfg = minimal();
        cfg.check_interval_seconds = 0;
        assert!(matches!(
            Settings::resolve(&cfg),
            Err(SunriseError::Config(_))
        ));
    }

    #[test]
    fn resolve_rejects_empty_trigger_and_command() {
        let mut cfg = minimal();
        cfg.trigger = String::new();
        assert!(Settings::resolve(&cfg).is_err());

        let mut cfg = minimal();
        cfg.wake_command = " ".into();
        let err = Settings::resolve(&cfg).unwrap_err();
        assert!(err.to_string().contains("wake_command"));
    }

    #[test]
    fn validate_clean_config_has_no_errors() {
        let warnings = minimal().validate();
        assert!(!warnings.iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_reports_resolve_errors() {
        let mut cfg = minimal();
        cfg.check_interval_seconds = 0;
        cfg.trigger = String::new();
        cfg.restart_enabled = true;
        let warnings = cfg.validate();
        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message.as_str())
            .collect();
        assert!(errors.iter().any(|m| m.contains("check_interval_seconds")));
        assert!(errors.iter().any(|m| m.contains("trigger")));
        assert!(errors.iter().any(|m| m.contains("stop_command is required")));
        assert!(errors.iter().any(|m| m.contains("start_command is required")));
    }

    #[test]
    fn validate_unknown_program_warning() {
        let mut cfg = minimal();
        cfg.wake_command = "no-such-wake-tool-for-sunrise --on".into();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| {
            w.level == WarnLevel::Warning && w.message.contains("not found on PATH")
        }));
    }

    #[test]
    fn validate_skips_path_lookup_for_explicit_paths() {
        let mut cfg = minimal();
        cfg.wake_command = "/opt/tools/wake --on".into();
        let warnings = cfg.validate();
        assert!(!warnings.iter().any(|w| w.message.contains("not found on PATH")));
    }

    #[test]
    fn validate_unused_restart_commands_warning() {
        let mut cfg = minimal();
        cfg.start_command = Some("sunshine".into());
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("restart_enabled is false")));
    }

    #[test]
    fn validate_zero_wait_with_restart_warning() {
        let mut cfg = minimal();
        cfg.restart_enabled = true;
        cfg.stop_command = Some("/bin/false".into());
        cfg.start_command = Some("/bin/true".into());
        cfg.wake_wait_seconds = 0;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("race")));
    }
}
