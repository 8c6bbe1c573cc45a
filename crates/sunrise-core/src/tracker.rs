//! Deduplication of trigger occurrences across polls.
//!
//! The log is re-read in full on every poll, so the same trigger line is seen
//! many times. [`OccurrenceTracker`] remembers the newest timestamp it has
//! already reported and only reports a trigger again once a strictly later
//! one shows up. A shrinking file means Sunshine recreated its log; the
//! remembered timestamp is dropped so the fresh log is judged on its own.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::observe::LogObservation;
use crate::timestamp::parse_timestamp;

/// A log line containing the trigger, with its parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerEvent {
    pub line: String,
    pub timestamp: DateTime<Local>,
}

/// State carried from one poll to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingState {
    pub last_file_size: u64,
    pub last_handled: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    /// No line with a parsable timestamp contains the trigger.
    NoTrigger,
    /// A trigger newer than anything handled before.
    NewTrigger(TriggerEvent),
    /// The newest trigger was already reported by an earlier poll.
    AlreadyHandled { handled_at: DateTime<Local> },
}

/// Result of feeding one observation to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scan {
    pub detection: Detection,
    /// The file shrank since the previous poll.
    pub rotated: bool,
    /// Lines containing the trigger, parsable or not.
    pub matching_lines: usize,
    /// Matching lines skipped because their timestamp did not parse.
    pub unparsable_lines: usize,
}

#[derive(Debug, Clone)]
pub struct OccurrenceTracker {
    trigger: String,
    state: TrackingState,
}

impl OccurrenceTracker {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            state: TrackingState::default(),
        }
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Decide whether `obs` holds a trigger that has not been handled yet.
    ///
    /// Reporting [`Detection::NewTrigger`] marks it handled; the caller is
    /// expected to act on it.
    pub fn observe(&mut self, obs: &LogObservation) -> Scan {
        let rotated = obs.size < self.state.last_file_size;
        if rotated {
            tracing::info!(
                previous_size = self.state.last_file_size,
                size = obs.size,
                "log appears to have rotated; resetting trigger tracking"
            );
            self.state.last_handled = None;
        }
        self.state.last_file_size = obs.size;

        let mut latest: Option<TriggerEvent> = None;
        let mut matching_lines = 0;
        let mut unparsable_lines = 0;

        for line in obs.lines.iter().filter(|l| l.contains(&self.trigger)) {
            matching_lines += 1;
            let timestamp = match parse_timestamp(line) {
                Ok(t) => t,
                Err(e) => {
                    unparsable_lines += 1;
                    tracing::warn!(line = %line, error = %e, "unable to parse log timestamp; skipping line");
                    continue;
                }
            };
            if latest.as_ref().map_or(true, |l| timestamp > l.timestamp) {
                latest = Some(TriggerEvent {
                    line: line.clone(),
                    timestamp,
                });
            }
        }

        let detection = match latest {
            None => {
                self.state.last_handled = None;
                Detection::NoTrigger
            }
            Some(event) => match self.state.last_handled {
                Some(handled) if event.timestamp <= handled => {
                    Detection::AlreadyHandled { handled_at: handled }
                }
                _ => {
                    self.state.last_handled = Some(event.timestamp);
                    Detection::NewTrigger(event)
                }
            },
        };

        Scan {
            detection,
            rotated,
            matching_lines,
            unparsable_lines,
        }
    }
}
