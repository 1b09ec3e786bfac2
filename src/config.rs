//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variables read by [`ClientConfig::from_env`].
pub mod env_keys {
    /// Base URL of the platform API. Required.
    pub const API_BASE: &str = "ENROLL_API_BASE";
    /// Timeout for the final submission request, in seconds.
    pub const SUBMIT_TIMEOUT_SECS: &str = "ENROLL_SUBMIT_TIMEOUT_SECS";
    /// Directory for file-backed session state. Unset means in-memory only.
    pub const STATE_DIR: &str = "ENROLL_STATE_DIR";
}

/// Configuration for the signup client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API, e.g. `http://localhost:5000/api`.
    pub api_base: String,
    /// Timeout applied to the final submission request.
    pub submit_timeout: Duration,
    /// Directory for file-backed session state, if persistence across
    /// process restarts is wanted.
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api".to_string(),
            submit_timeout: Duration::from_secs(30),
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from `ENROLL_*` environment variables.
    ///
    /// The API base is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = std::env::var(env_keys::API_BASE)
            .map_err(|_| ConfigError::MissingEnvVar(env_keys::API_BASE.to_string()))?;

        let submit_timeout = match std::env::var(env_keys::SUBMIT_TIMEOUT_SECS) {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::SUBMIT_TIMEOUT_SECS.to_string(),
                    message: format!("expected a number of seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Self::default().submit_timeout,
        };

        let state_dir = std::env::var(env_keys::STATE_DIR).ok().map(PathBuf::from);

        Ok(Self {
            api_base,
            submit_timeout,
            state_dir,
        })
    }

    /// API base with any trailing slash removed, ready for path joining.
    pub fn api_base_trimmed(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}
