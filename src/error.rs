use thiserror::Error;

use crate::gnc::CruiseMode;

/// Reason a mode request was turned down. State is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransitionRefused {
    #[error("Course hold unavailable at latitude {latitude:.1} deg (limit {limit:.0} deg)")]
    NearPole { latitude: f64, limit: f64 },

    #[error("Can't select {0} mode while autopilot is disabled")]
    Inactive(CruiseMode),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid parameter `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { name, reason: reason.into() }
    }
}
