use crate::error::{AckdError, Result};
use crate::io::atomic_write;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ApiServer
// ---------------------------------------------------------------------------

/// Which PagerDuty REST endpoint the account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiServer {
    Us,
    Eu,
}

impl ApiServer {
    pub fn base_url(self) -> &'static str {
        match self {
            ApiServer::Us => "https://api.pagerduty.com",
            ApiServer::Eu => "https://api.eu.pagerduty.com",
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PagerDuty REST API key (read access to incidents, write for
    /// acknowledge).
    pub api_key: String,

    #[serde(default = "default_api_server")]
    pub api_server: ApiServer,

    /// Operator email sent as the `From` header on acknowledge calls.
    #[serde(default)]
    pub default_from_email: Option<String>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Scope tag for persisted control records, so several configured
    /// accounts on one machine keep their registries apart.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Port for the control API server (0 = OS-assigned).
    #[serde(default)]
    pub listen_port: u16,
}

fn default_api_server() -> ApiServer {
    ApiServer::Us
}

fn default_poll_interval() -> u64 {
    30
}

fn default_scope() -> String {
    "default".to_string()
}

impl Config {
    /// Load and validate the config file at `path`.
    ///
    /// A missing file and an unparseable file are distinct errors so the CLI
    /// can tell the operator which problem they have.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(AckdError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&data).map_err(|source| {
            AckdError::ConfigInvalid {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if config.api_key.trim().is_empty() {
            return Err(AckdError::MissingApiKey);
        }
        Ok(config)
    }

    /// Atomically write this config to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        atomic_write(path, data.as_bytes())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Operator email for the `From` header, if one is configured.
    pub fn from_email(&self) -> Option<String> {
        self.default_from_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
    }
}
