//! Reading the watched log into a [`LogObservation`].
//!
//! The whole file is read on every poll. Size comes from metadata so a
//! shrinking file can be told apart from one that was rewritten.

use std::path::Path;

/// What a single poll saw of the log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogObservation {
    /// File size in bytes as reported by the filesystem.
    pub size: u64,
    /// Every line currently in the file, in order, without line terminators.
    pub lines: Vec<String>,
}

impl LogObservation {
    /// Build an observation from in-memory text. Size is the byte length.
    pub fn from_text(text: &str) -> Self {
        Self {
            size: text.len() as u64,
            lines: text.lines().map(str::to_owned).collect(),
        }
    }
}

/// Stat and read the whole log at `path`.
///
/// The size comes from metadata taken before the read, so a writer appending
/// in between can only make `lines` longer than `size` suggests, never shorter.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_observation(path: &Path) -> std::io::Result<LogObservation> {
    let size = std::fs::metadata(path)?.len();
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(LogObservation {
        size,
        lines: text.lines().map(str::to_owned).collect(),
    })
}
