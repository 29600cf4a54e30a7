//! # Engine Configuration
//!
//! Settings the engine itself needs: the environment handlers run in, the
//! project name injected into plugin contexts, and logging options.
//!
//! Values come from built-in defaults overridden by `ACTION_ROUTER_*`
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ACTION_ROUTER_ENVIRONMENT` | `environment` |
//! | `ACTION_ROUTER_PROJECT_NAME` | `project_name` |
//! | `ACTION_ROUTER_LOG_LEVEL` | `log_level` |
//! | `ACTION_ROUTER_JSON_LOGS` | `json_logs` |

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_PROJECT_NAME, LOG_LEVELS};
use crate::logging::detect_environment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required configuration field '{field}'")]
    MissingField { field: String },

    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the environment actions run against, reported in configuration errors.
    pub environment: String,
    pub project_name: String,
    /// Explicit log filter; derived from `environment` when unset.
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            log_level: None,
            json_logs: false,
        }
    }
}

impl EngineConfig {
    /// Load from defaults and `ACTION_ROUTER_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        let loaded: EngineConfig = config::Config::builder()
            .set_default("environment", defaults.environment)?
            .set_default("project_name", defaults.project_name)?
            .set_default("json_logs", defaults.json_logs)?
            .add_source(config::Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Configuration built in code, e.g. by an embedding application or tests.
    pub fn for_environment(environment: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            project_name: project_name.into(),
            log_level: None,
            json_logs: false,
        }
    }

    #[must_use]
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = Some(log_level.into());
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "environment".to_string(),
            });
        }
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "project_name".to_string(),
            });
        }
        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "log_level".to_string(),
                    value: level.clone(),
                    context: format!("expected one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }
        Ok(())
    }
}
