use crate::output::{print_fields, print_json};
use anyhow::Context;
use std::path::Path;
use sunrise_core::observe::read_observation;
use sunrise_core::tracker::{Detection, OccurrenceTracker};

use super::load_settings;

/// Scan the log the way the daemon's first tick would, without acting on it.
pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;
    let observation = read_observation(&settings.log_path)
        .with_context(|| format!("unable to read log file {}", settings.log_path.display()))?;

    let mut tracker = OccurrenceTracker::new(settings.trigger.clone());
    let scan = tracker.observe(&observation);

    if json {
        print_json(&serde_json::json!({
            "log_path": settings.log_path,
            "trigger": settings.trigger,
            "size": observation.size,
            "lines": observation.lines.len(),
            "scan": scan,
        }))?;
        return Ok(());
    }

    let mut fields = vec![
        ("log", settings.log_path.display().to_string()),
        ("trigger", settings.trigger.clone()),
        ("size", format!("{} bytes, {} lines", observation.size, observation.lines.len())),
        ("matching lines", scan.matching_lines.to_string()),
        ("unparsable", scan.unparsable_lines.to_string()),
    ];
    match &scan.detection {
        Detection::NewTrigger(event) => {
            fields.push(("status", "trigger present; a new daemon would wake the display".into()));
            fields.push(("latest", event.timestamp.to_rfc3339()));
            fields.push(("line", event.line.clone()));
        }
        Detection::NoTrigger => fields.push(("status", "no trigger in log".into())),
        Detection::AlreadyHandled { handled_at } => {
            fields.push(("status", "already handled".into()));
            fields.push(("latest", handled_at.to_rfc3339()));
        }
    }
    print_fields(&fields);
    Ok(())
}
