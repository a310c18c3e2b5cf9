//! Options passed to `boot()` from the page.

use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

pub const DEFAULT_MODULE_URL: &str = "game.wasm";
pub const DEFAULT_CANVAS_ID: &str = "game";
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ShellConfig {
    /// URL of the compiled game module.
    pub module_url: String,
    /// Id of the `<canvas>` the frame buffer is drawn into.
    pub canvas_id: String,
    pub poll_interval_ms: u32,
    /// Element whose text receives load status messages.
    pub status_element: Option<String>,
    pub log_level: LevelFilter,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            module_url: DEFAULT_MODULE_URL.to_string(),
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            status_element: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl ShellConfig {
    /// Deserializes and validates. The deserializer's message is kept in the error.
    pub fn parse<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, ConfigError> {
        let config =
            Self::deserialize(deserializer).map_err(|err| ConfigError::Options(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "moduleUrl",
                reason: "must not be empty",
            });
        }
        if self.canvas_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "canvasId",
                reason: "must not be empty",
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "pollIntervalMs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.poll_interval_ms))
    }
}
