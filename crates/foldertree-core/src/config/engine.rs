//! Folder tree engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits and tuning for the folder tree engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum folder name length in characters, after trimming.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Optional deadline for a single remote store call. An elapsed
    /// deadline is handled exactly like a rejected call.
    #[serde(default)]
    pub remote_timeout_ms: Option<u64>,
    /// Capacity of the engine event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl EngineConfig {
    /// The remote call deadline, if one is configured.
    pub fn remote_timeout(&self) -> Option<Duration> {
        self.remote_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings the engine cannot operate with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_name_length == 0 {
            return Err(AppError::configuration(
                "engine.max_name_length must be greater than zero",
            ));
        }
        if self.event_buffer == 0 {
            return Err(AppError::configuration(
                "engine.event_buffer must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
            remote_timeout_ms: None,
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_max_name_length() -> usize {
    100
}

fn default_event_buffer() -> usize {
    256
}
