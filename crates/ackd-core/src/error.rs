use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AckdError {
    #[error("config file not found: {} (create it or pass --config)", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config {}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config is missing an API key")]
    MissingApiKey,

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AckdError>;
