//! # Action Catalogue
//!
//! The closed set of actions the engine can dispatch.
//!
//! ## Scopes
//!
//! ```text
//! ActionKind
//! ├── Provider(ProviderAction)   environment actions, keyed by plugin
//! └── Module(ModuleAction)       keyed by module type, then plugin
//!     ├── Module scope           build, test, publish, ...
//!     ├── Service scope          deploy, status, logs, ...
//!     └── Task scope             runTask, getTaskResult
//! ```
//!
//! Every action declares its result schema once in [`descriptors`]; the
//! optional built-in fallback lives in [`defaults`].

pub mod defaults;
pub mod descriptors;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use descriptors::{descriptor, ActionDescriptor};

/// Which entity an action operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionScope {
    Provider,
    Module,
    Service,
    Task,
}

/// Environment-level actions. Handlers are registered per plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderAction {
    GetEnvironmentStatus,
    PrepareEnvironment,
    CleanupEnvironment,
    GetSecret,
    SetSecret,
    DeleteSecret,
    GetDebugInfo,
}

impl ProviderAction {
    pub const ALL: [ProviderAction; 7] = [
        ProviderAction::GetEnvironmentStatus,
        ProviderAction::PrepareEnvironment,
        ProviderAction::CleanupEnvironment,
        ProviderAction::GetSecret,
        ProviderAction::SetSecret,
        ProviderAction::DeleteSecret,
        ProviderAction::GetDebugInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderAction::GetEnvironmentStatus => "getEnvironmentStatus",
            ProviderAction::PrepareEnvironment => "prepareEnvironment",
            ProviderAction::CleanupEnvironment => "cleanupEnvironment",
            ProviderAction::GetSecret => "getSecret",
            ProviderAction::SetSecret => "setSecret",
            ProviderAction::DeleteSecret => "deleteSecret",
            ProviderAction::GetDebugInfo => "getDebugInfo",
        }
    }
}

/// Module, service and task actions. Handlers are registered per module type and plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleAction {
    DescribeType,
    GetBuildStatus,
    Build,
    Publish,
    RunModule,
    TestModule,
    GetTestResult,
    GetServiceStatus,
    DeployService,
    HotReloadService,
    DeleteService,
    ExecInService,
    GetServiceLogs,
    RunService,
    RunTask,
    GetTaskResult,
}

impl ModuleAction {
    pub const ALL: [ModuleAction; 16] = [
        ModuleAction::DescribeType,
        ModuleAction::GetBuildStatus,
        ModuleAction::Build,
        ModuleAction::Publish,
        ModuleAction::RunModule,
        ModuleAction::TestModule,
        ModuleAction::GetTestResult,
        ModuleAction::GetServiceStatus,
        ModuleAction::DeployService,
        ModuleAction::HotReloadService,
        ModuleAction::DeleteService,
        ModuleAction::ExecInService,
        ModuleAction::GetServiceLogs,
        ModuleAction::RunService,
        ModuleAction::RunTask,
        ModuleAction::GetTaskResult,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModuleAction::DescribeType => "describeType",
            ModuleAction::GetBuildStatus => "getBuildStatus",
            ModuleAction::Build => "build",
            ModuleAction::Publish => "publish",
            ModuleAction::RunModule => "runModule",
            ModuleAction::TestModule => "testModule",
            ModuleAction::GetTestResult => "getTestResult",
            ModuleAction::GetServiceStatus => "getServiceStatus",
            ModuleAction::DeployService => "deployService",
            ModuleAction::HotReloadService => "hotReloadService",
            ModuleAction::DeleteService => "deleteService",
            ModuleAction::ExecInService => "execInService",
            ModuleAction::GetServiceLogs => "getServiceLogs",
            ModuleAction::RunService => "runService",
            ModuleAction::RunTask => "runTask",
            ModuleAction::GetTaskResult => "getTaskResult",
        }
    }

    pub fn scope(self) -> ActionScope {
        match self {
            ModuleAction::DescribeType
            | ModuleAction::GetBuildStatus
            | ModuleAction::Build
            | ModuleAction::Publish
            | ModuleAction::RunModule
            | ModuleAction::TestModule
            | ModuleAction::GetTestResult => ActionScope::Module,
            ModuleAction::GetServiceStatus
            | ModuleAction::DeployService
            | ModuleAction::HotReloadService
            | ModuleAction::DeleteService
            | ModuleAction::ExecInService
            | ModuleAction::GetServiceLogs
            | ModuleAction::RunService => ActionScope::Service,
            ModuleAction::RunTask | ModuleAction::GetTaskResult => ActionScope::Task,
        }
    }
}

/// Any dispatchable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionKind {
    Provider(ProviderAction),
    Module(ModuleAction),
}

impl ActionKind {
    pub fn all() -> impl Iterator<Item = ActionKind> {
        ProviderAction::ALL
            .into_iter()
            .map(ActionKind::Provider)
            .chain(ModuleAction::ALL.into_iter().map(ActionKind::Module))
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Provider(action) => action.name(),
            ActionKind::Module(action) => action.name(),
        }
    }

    pub fn scope(self) -> ActionScope {
        match self {
            ActionKind::Provider(_) => ActionScope::Provider,
            ActionKind::Module(action) => action.scope(),
        }
    }
}

impl From<ProviderAction> for ActionKind {
    fn from(action: ProviderAction) -> Self {
        ActionKind::Provider(action)
    }
}

impl From<ModuleAction> for ActionKind {
    fn from(action: ModuleAction) -> Self {
        ActionKind::Module(action)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ProviderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
