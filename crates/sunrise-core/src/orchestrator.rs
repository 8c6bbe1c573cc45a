//! One poll of the recovery daemon.
//!
//! ```text
//! tick ─▶ read log ─▶ tracker ─┬─ NoTrigger / AlreadyHandled ─▶ done
//!                             └─ NewTrigger ─▶ wake ─▶ wait ─▶ [stop ─▶ start] ─▶ done
//! ```
//!
//! Only a log read failure is returned as an error. Every command failure is
//! logged and folded into the [`TickOutcome`].

use std::time::Duration;

use serde::Serialize;

use crate::command::{CommandSpec, LaunchError, Launcher, RunStatus};
use crate::config::Settings;
use crate::error::{Result, SunriseError};
use crate::observe::read_observation;
use crate::tracker::{Detection, OccurrenceTracker, TriggerEvent};

/// What happened to one synchronously run command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Succeeded,
    Failed { code: Option<i32> },
    LaunchFailed { error: String },
}

impl StepResult {
    fn from_run(outcome: &std::result::Result<RunStatus, LaunchError>) -> Self {
        match outcome {
            Ok(status) if status.success => StepResult::Succeeded,
            Ok(status) => StepResult::Failed { code: status.code },
            Err(e) => StepResult::LaunchFailed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartReport {
    pub stop: StepResult,
    /// Whether the start command was launched. Its exit is never awaited.
    pub started: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    NoTrigger,
    AlreadyHandled,
    Remediated {
        event: TriggerEvent,
        wake: StepResult,
        restart: Option<RestartReport>,
    },
}

/// Owns the tracker and drives the recovery sequence, one tick at a time.
pub struct Orchestrator<L> {
    settings: Settings,
    tracker: OccurrenceTracker,
    launcher: L,
}

impl<L: Launcher> Orchestrator<L> {
    pub fn new(settings: Settings, launcher: L) -> Self {
        let tracker = OccurrenceTracker::new(settings.trigger.clone());
        Self {
            settings,
            tracker,
            launcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &OccurrenceTracker {
        &self.tracker
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Scan the log once and, on a new trigger, run the recovery sequence.
    ///
    /// Returns `Err` only when the log cannot be read.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.launcher.reap();

        let path = &self.settings.log_path;
        tracing::debug!(path = %path.display(), "checking log for trigger");
        let observation = read_observation(path).map_err(|source| SunriseError::LogRead {
            path: path.clone(),
            source,
        })?;

        let scan = self.tracker.observe(&observation);
        tracing::debug!(
            size = observation.size,
            lines = observation.lines.len(),
            matching = scan.matching_lines,
            unparsable = scan.unparsable_lines,
            "log scanned"
        );

        let event = match scan.detection {
            Detection::NoTrigger => {
                tracing::debug!("no trigger in log");
                return Ok(TickOutcome::NoTrigger);
            }
            Detection::AlreadyHandled { handled_at } => {
                tracing::debug!(handled_at = %handled_at.to_rfc3339(), "trigger already handled");
                return Ok(TickOutcome::AlreadyHandled);
            }
            Detection::NewTrigger(event) => event,
        };

        tracing::info!(
            at = %event.timestamp.to_rfc3339(),
            line = %event.line,
            "new trigger found; waking display"
        );
        let wake = self.wake();
        wait(self.settings.wake_wait);
        let restart = self.restart();

        Ok(TickOutcome::Remediated {
            event,
            wake,
            restart,
        })
    }

    fn wake(&mut self) -> StepResult {
        let spec = &self.settings.wake;
        tracing::info!(command = %spec, "running wake command");
        let outcome = self.launcher.run(spec);
        match &outcome {
            Ok(status) if status.success => tracing::info!("wake command completed"),
            Ok(status) => tracing::warn!(
                command = %spec,
                %status,
                stderr = %status.stderr,
                "wake command failed"
            ),
            Err(e) => tracing::warn!(error = %e, "could not run wake command"),
        }
        StepResult::from_run(&outcome)
    }

    fn restart(&mut self) -> Option<RestartReport> {
        let commands = self.settings.restart.as_ref()?;
        let stop = stop(&mut self.launcher, &commands.stop);
        let started = start(&mut self.launcher, &commands.start);
        Some(RestartReport { stop, started })
    }
}

fn wait(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tracing::info!(seconds = duration.as_secs(), "waiting for display to come up");
    std::thread::sleep(duration);
}

/// The dependent process may not be running, so failure here is expected.
fn stop<L: Launcher>(launcher: &mut L, spec: &CommandSpec) -> StepResult {
    tracing::info!(command = %spec, "running stop command");
    let outcome = launcher.run(spec);
    match &outcome {
        Ok(status) if status.success => tracing::info!("stop command completed"),
        Ok(status) => tracing::info!(%status, "stop command failed, ignoring"),
        Err(e) => tracing::info!(error = %e, "stop command could not run, ignoring"),
    }
    StepResult::from_run(&outcome)
}

fn start<L: Launcher>(launcher: &mut L, spec: &CommandSpec) -> bool {
    tracing::info!(command = %spec, "launching start command");
    match launcher.spawn_detached(spec) {
        Ok(()) => {
            tracing::info!("start command launched");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "could not launch start command");
            false
        }
    }
}
