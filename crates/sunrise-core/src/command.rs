//! External command specs and the process launcher seam.
//!
//! Commands come from the config as single strings and are split into a
//! program and arguments once, at startup. [`Launcher`] is the boundary the
//! orchestrator drives; [`SystemLauncher`] backs it with real processes.

use std::fmt;
use std::process::{Child, Command, Stdio};

use serde::Serialize;
use thiserror::Error;

use crate::error::{Result, SunriseError};

/// Bytes of stderr kept when a synchronous command fails.
const STDERR_TAIL_BYTES: usize = 500;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Split a command line using POSIX shell quoting rules.
    pub fn parse(line: &str) -> Result<Self> {
        let words = shell_words::split(line)
            .map_err(|e| SunriseError::Command(format!("'{line}': {e}")))?;
        let mut words = words.into_iter();
        let program = words
            .next()
            .ok_or_else(|| SunriseError::Command("command is empty".into()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

/// How a synchronously run command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Tail of stderr, empty when the command succeeded.
    pub stderr: String,
}

impl RunStatus {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn exited(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
            stderr: String::new(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// The command could not be started at all.
#[derive(Debug, Error)]
#[error("failed to launch '{command}': {source}")]
pub struct LaunchError {
    pub command: String,
    #[source]
    pub source: std::io::Error,
}

impl LaunchError {
    pub fn new(spec: &CommandSpec, source: std::io::Error) -> Self {
        Self {
            command: spec.to_string(),
            source,
        }
    }
}

/// Runs external commands for the orchestrator.
pub trait Launcher {
    /// Run `spec` to completion.
    fn run(&mut self, spec: &CommandSpec) -> std::result::Result<RunStatus, LaunchError>;

    /// Start `spec` and return without waiting for it.
    fn spawn_detached(&mut self, spec: &CommandSpec) -> std::result::Result<(), LaunchError>;

    /// Collect detached children that have exited since the last call.
    fn reap(&mut self) {}
}

/// [`Launcher`] backed by `std::process`.
#[derive(Debug, Default)]
pub struct SystemLauncher {
    detached: Vec<(String, Child)>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detached children that have not been reaped yet.
    pub fn pending(&self) -> usize {
        self.detached.len()
    }
}

impl Launcher for SystemLauncher {
    fn run(&mut self, spec: &CommandSpec) -> std::result::Result<RunStatus, LaunchError> {
        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| LaunchError::new(spec, e))?;

        let stderr = if output.status.success() {
            String::new()
        } else {
            tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_BYTES)
        };
        Ok(RunStatus {
            success: output.status.success(),
            code: output.status.code(),
            stderr,
        })
    }

    fn spawn_detached(&mut self, spec: &CommandSpec) -> std::result::Result<(), LaunchError> {
        let child = spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::new(spec, e))?;
        tracing::debug!(command = %spec, pid = child.id(), "detached process started");
        self.detached.push((spec.to_string(), child));
        Ok(())
    }

    fn reap(&mut self) {
        self.detached.retain_mut(|(command, child)| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(command = %command, %status, "detached process exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "unable to poll detached process");
                false
            }
        });
    }
}

/// Last `max` bytes of `s`, trimmed, cut on a char boundary.
fn tail(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.len() <= max {
        return s.to_string();
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}
