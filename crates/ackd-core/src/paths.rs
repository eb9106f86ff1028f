use crate::error::{AckdError, Result};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ACKD_DIR: &str = ".ackd";
pub const CONFIG_FILE: &str = "config.yaml";
pub const CONTROLS_DIR: &str = "controls";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `~/.ackd/`
pub fn user_ackd_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(AckdError::HomeNotFound)?;
    Ok(home.join(ACKD_DIR))
}

/// `~/.ackd/config.yaml`
pub fn user_config_path() -> Result<PathBuf> {
    Ok(user_ackd_dir()?.join(CONFIG_FILE))
}

/// `~/.ackd/controls/<scope>/` — persisted control records for one
/// configured account scope.
pub fn user_controls_dir(scope: &str) -> Result<PathBuf> {
    Ok(user_ackd_dir()?.join(CONTROLS_DIR).join(scope))
}
