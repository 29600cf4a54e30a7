//! Modules, services, tasks and the runtime context handed to service and task actions.
//!
//! These are owned by the configuration layer; the engine only reads them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A typed, buildable unit of source content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    #[serde(rename = "type")]
    pub module_type: String,
    /// Content fingerprint of the module sources.
    pub version: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub build_dependencies: Vec<String>,
    #[serde(default)]
    pub spec: Value,
    /// Fields injected by the owning provider during configuration. Stripped
    /// before the module is passed to a handler.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_internals: BTreeMap<String, Value>,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        module_type: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module_type: module_type.into(),
            version: version.into(),
            path: PathBuf::new(),
            build_dependencies: Vec::new(),
            spec: Value::Null,
            provider_internals: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_provider_internal(mut self, key: impl Into<String>, value: Value) -> Self {
        self.provider_internals.insert(key.into(), value);
        self
    }

    /// Copy of the module without provider-injected internals.
    pub fn sanitized(&self) -> Module {
        Module {
            provider_internals: BTreeMap::new(),
            ..self.clone()
        }
    }
}

/// A deployable runtime unit belonging to exactly one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub module: Module,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub spec: Value,
}

impl Service {
    pub fn new(name: impl Into<String>, module: Module) -> Self {
        Self {
            name: name.into(),
            module,
            dependencies: Vec::new(),
            spec: Value::Null,
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// A one-shot runnable unit belonging to exactly one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    pub module: Module,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub spec: Value,
}

impl Task {
    pub fn new(name: impl Into<String>, module: Module) -> Self {
        Self {
            name: name.into(),
            module,
            dependencies: Vec::new(),
            spec: Value::Null,
        }
    }

    /// `<module>.<task>` identity used in log output.
    pub fn key(&self) -> String {
        format!("{}.{}", self.module.name, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Build,
    Service,
    Task,
}

/// Outputs of one resolved runtime dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDependency {
    pub name: String,
    pub kind: DependencyKind,
    pub version: String,
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
}

/// Computed dependency outputs for a service or task, built by the scheduling layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeContext {
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: Vec<RuntimeDependency>,
}
