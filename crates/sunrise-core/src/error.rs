use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SunriseError {
    #[error("unable to read log file {path}: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("config file not found: {0} (run 'sunrise init' to create one)")]
    ConfigNotFound(PathBuf),

    #[error("config file already exists: {0} (pass --force to overwrite)")]
    ConfigExists(PathBuf),

    #[error("invalid command: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SunriseError>;
