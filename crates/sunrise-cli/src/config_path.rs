use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sunrise.yaml";
pub const SYSTEM_CONFIG: &str = "/etc/sunrise/sunrise.yaml";

/// Resolve the config file path.
///
/// Priority:
/// 1. `--config` flag / `SUNRISE_CONFIG` env var (passed in as `explicit`)
/// 2. `./sunrise.yaml`
/// 3. `$HOME/.config/sunrise/sunrise.yaml`
/// 4. `/etc/sunrise/sunrise.yaml`, whether or not it exists
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(explicit, &cwd, home::home_dir().as_deref())
}

fn resolve_from(explicit: Option<&Path>, cwd: &Path, home: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        return local;
    }

    if let Some(home) = home {
        let user = user_config(home);
        if user.is_file() {
            return user;
        }
    }

    PathBuf::from(SYSTEM_CONFIG)
}

fn user_config(home: &Path) -> PathBuf {
    home.join(".config").join("sunrise").join(CONFIG_FILE)
}
