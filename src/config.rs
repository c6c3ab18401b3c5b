//! Service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Role;

/// Failures while loading a [`ServiceConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config text is not valid JSON for this shape.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deployment policy for [`crate::service::EventService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Roles whose participants make an event eligible for cost recompute.
    pub cost_roles: Vec<Role>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cost_roles: vec![Role::Organizer],
        }
    }
}

impl ServiceConfig {
    /// Parses a JSON document such as `{"cost_roles": ["ORGANIZER", "SPEAKER"]}`.
    ///
    /// Missing fields fall back to [`ServiceConfig::default`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
