//! Error types for timer configuration and control

use std::path::PathBuf;
use thiserror::Error;

use super::state::{TimerAction, TimerState};

/// Errors while turning `TimerSettings` into a `TimerConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("invalid say-data item {index}: {reason}")]
    InvalidSayData { index: usize, reason: String },

    #[error("nothing to say: interval spec and say-data are both empty")]
    NothingToSay,

    #[error("failed to read say-data file {}", path.display())]
    ReadSayData {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse say-data: {0}")]
    ParseSayData(#[source] toml::de::Error),
}

/// Errors from timer control operations
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: TimerAction,
        state: TimerState,
    },

    #[error("pausing is disabled for this timer")]
    PauseDisabled,

    #[error("timer is not configured")]
    NotConfigured,

    #[error("invalid timer configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("timer service has shut down")]
    ServiceClosed,
}
