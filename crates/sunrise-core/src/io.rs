use crate::error::{Result, SunriseError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Parent directories are created as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a config file, refusing to replace an existing one unless `force`.
pub fn write_config(path: &Path, data: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SunriseError::ConfigExists(path.to_path_buf()));
    }
    atomic_write(path, data.as_bytes())
}
