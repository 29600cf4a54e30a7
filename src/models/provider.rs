//! Providers and the execution context injected into every handler call.

use crate::constants::DEFAULT_PROVIDER_NAME;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured plugin instance bound to the current environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Value::Null,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// The sentinel provider that owns built-in default handlers.
    pub fn default_provider() -> Self {
        Self::new(DEFAULT_PROVIDER_NAME)
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_PROVIDER_NAME
    }
}

/// Execution context for a handler, scoped to the provider that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContext {
    pub project_name: String,
    pub environment_name: String,
    pub provider: Provider,
}
