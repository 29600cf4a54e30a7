//! Typed action results.
//!
//! Each struct mirrors the result schema declared for its action in
//! [`actions::descriptors`](crate::actions::descriptors). Optional fields are
//! omitted on serialization so that handler output built from these types
//! always passes validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_manual_init: Option<bool>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl EnvironmentStatus {
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }
}

pub type EnvironmentStatusMap = HashMap<String, EnvironmentStatus>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareEnvironmentResult {
    pub status: EnvironmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanupEnvironmentResult {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSecretResult {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSecretResult {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSecretResult {
    pub found: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub info: Value,
}

pub type DebugInfoMap = HashMap<String, DebugInfo>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTypeDescription {
    pub docs: String,
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub module_name: String,
    pub command: Vec<String>,
    pub version: String,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(flatten)]
    pub run: RunResult,
    pub test_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTaskResult {
    #[serde(flatten)]
    pub run: RunResult,
    pub task_name: String,
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Ready,
    Deploying,
    Stopped,
    Unhealthy,
    Unknown,
    Outdated,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceIngress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub path: String,
    pub port: u16,
    pub protocol: IngressProtocol,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ServiceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_replicas: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingresses: Vec<ServiceIngress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ServiceStatus {
    pub fn with_state(state: ServiceState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn is_missing(&self) -> bool {
        self.state == Some(ServiceState::Missing)
    }
}

pub type ServiceStatusMap = HashMap<String, ServiceStatus>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotReloadServiceResult {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecInServiceResult {
    pub code: i32,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetServiceLogsResult {}

/// Provider and service statuses for the whole environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllEnvironmentStatus {
    pub providers: EnvironmentStatusMap,
    pub services: ServiceStatusMap,
}

/// Outcome of tearing down an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTeardown {
    pub service_statuses: ServiceStatusMap,
    pub environment_statuses: EnvironmentStatusMap,
}
