//! Action-specific parameters.
//!
//! These structs carry only what the caller supplies for one action. The
//! shared context (`ctx`, `log`) and the target entity are attached by the
//! engine when it composes an [`ActionInput`](crate::orchestration::ActionInput),
//! so no parameter struct can collide with them.

use super::entities::RuntimeContext;
use crate::actions::{ActionKind, ModuleAction, ProviderAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default)]
pub struct GetEnvironmentStatusParams {}

#[derive(Debug, Clone, Default)]
pub struct PrepareEnvironmentParams {
    pub force: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CleanupEnvironmentParams {}

#[derive(Debug, Clone)]
pub struct GetSecretParams {
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct SetSecretParams {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct DeleteSecretParams {
    pub key: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetDebugInfoParams {}

#[derive(Debug, Clone, Default)]
pub struct DescribeTypeParams {}

#[derive(Debug, Clone, Default)]
pub struct GetBuildStatusParams {}

#[derive(Debug, Clone, Default)]
pub struct BuildModuleParams {}

#[derive(Debug, Clone, Default)]
pub struct PublishModuleParams {}

#[derive(Debug, Clone, Default)]
pub struct RunModuleParams {
    pub command: Vec<String>,
    pub interactive: bool,
    pub runtime_context: RuntimeContext,
    pub ignore_error: bool,
    pub timeout_secs: Option<u64>,
}

/// A test suite declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub spec: Value,
}

#[derive(Debug, Clone, Default)]
pub struct TestModuleParams {
    pub test_config: TestConfig,
    pub test_version: String,
    pub runtime_context: RuntimeContext,
}

#[derive(Debug, Clone, Default)]
pub struct GetTestResultParams {
    pub test_name: String,
    pub test_version: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetServiceStatusParams {
    pub hot_reload: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeployServiceParams {
    pub force: bool,
    pub hot_reload: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HotReloadServiceParams {}

#[derive(Debug, Clone, Default)]
pub struct DeleteServiceParams {}

#[derive(Debug, Clone, Default)]
pub struct ExecInServiceParams {
    pub command: Vec<String>,
    pub interactive: bool,
}

/// One line of service log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogEntry {
    pub service_name: String,
    pub timestamp: DateTime<Utc>,
    pub msg: String,
}

/// Channel handlers write log entries to.
pub type LogStream = mpsc::UnboundedSender<ServiceLogEntry>;

#[derive(Debug, Clone)]
pub struct GetServiceLogsParams {
    pub stream: LogStream,
    pub follow: bool,
    pub tail: Option<usize>,
}

impl GetServiceLogsParams {
    pub fn new(stream: LogStream) -> Self {
        Self {
            stream,
            follow: false,
            tail: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunServiceParams {
    pub interactive: bool,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct RunTaskParams {
    pub interactive: bool,
    pub timeout_secs: Option<u64>,
    pub task_version: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetTaskResultParams {
    pub task_version: String,
}

macro_rules! action_params {
    ($($variant:ident($params:ty) => $kind:expr),+ $(,)?) => {
        /// Parameters for exactly one action, tagged by the action they belong to.
        #[derive(Debug, Clone)]
        pub enum ActionParams {
            $($variant($params)),+
        }

        impl ActionParams {
            pub fn action(&self) -> ActionKind {
                match self {
                    $(ActionParams::$variant(_) => $kind.into()),+
                }
            }
        }

        $(
            impl From<$params> for ActionParams {
                fn from(params: $params) -> Self {
                    ActionParams::$variant(params)
                }
            }
        )+
    };
}

action_params! {
    GetEnvironmentStatus(GetEnvironmentStatusParams) => ProviderAction::GetEnvironmentStatus,
    PrepareEnvironment(PrepareEnvironmentParams) => ProviderAction::PrepareEnvironment,
    CleanupEnvironment(CleanupEnvironmentParams) => ProviderAction::CleanupEnvironment,
    GetSecret(GetSecretParams) => ProviderAction::GetSecret,
    SetSecret(SetSecretParams) => ProviderAction::SetSecret,
    DeleteSecret(DeleteSecretParams) => ProviderAction::DeleteSecret,
    GetDebugInfo(GetDebugInfoParams) => ProviderAction::GetDebugInfo,
    DescribeType(DescribeTypeParams) => ModuleAction::DescribeType,
    GetBuildStatus(GetBuildStatusParams) => ModuleAction::GetBuildStatus,
    Build(BuildModuleParams) => ModuleAction::Build,
    Publish(PublishModuleParams) => ModuleAction::Publish,
    RunModule(RunModuleParams) => ModuleAction::RunModule,
    TestModule(TestModuleParams) => ModuleAction::TestModule,
    GetTestResult(GetTestResultParams) => ModuleAction::GetTestResult,
    GetServiceStatus(GetServiceStatusParams) => ModuleAction::GetServiceStatus,
    DeployService(DeployServiceParams) => ModuleAction::DeployService,
    HotReloadService(HotReloadServiceParams) => ModuleAction::HotReloadService,
    DeleteService(DeleteServiceParams) => ModuleAction::DeleteService,
    ExecInService(ExecInServiceParams) => ModuleAction::ExecInService,
    GetServiceLogs(GetServiceLogsParams) => ModuleAction::GetServiceLogs,
    RunService(RunServiceParams) => ModuleAction::RunService,
    RunTask(RunTaskParams) => ModuleAction::RunTask,
    GetTaskResult(GetTaskResultParams) => ModuleAction::GetTaskResult,
}
