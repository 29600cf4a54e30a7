//! Built-in fallback handlers.
//!
//! Used only when no plugin in the environment implements the action. They run
//! under the default provider and their output is validated like any other.

use super::{ActionKind, ModuleAction, ProviderAction};
use crate::models::{
    BuildStatus, CleanupEnvironmentResult, EnvironmentStatus, ModuleTypeDescription,
    PrepareEnvironmentResult, PublishResult,
};
use crate::orchestration::ActionInput;
use crate::plugin::{handler_fn, respond, ActionHandler};
use serde_json::{json, Value};
use std::sync::Arc;

/// The default handler for `kind`, if the action has one.
pub fn default_handler(kind: ActionKind) -> Option<Arc<dyn ActionHandler>> {
    match kind {
        ActionKind::Provider(action) => provider_default(action),
        ActionKind::Module(action) => module_default(action),
    }
}

pub fn has_default(kind: ActionKind) -> bool {
    default_handler(kind).is_some()
}

fn provider_default(action: ProviderAction) -> Option<Arc<dyn ActionHandler>> {
    let handler = match action {
        ProviderAction::GetEnvironmentStatus => {
            handler_fn(|_input| async { respond(&EnvironmentStatus::ready()) })
        }
        ProviderAction::PrepareEnvironment => handler_fn(|_input| async {
            respond(&PrepareEnvironmentResult {
                status: EnvironmentStatus::ready(),
            })
        }),
        ProviderAction::CleanupEnvironment => {
            handler_fn(|_input| async { respond(&CleanupEnvironmentResult {}) })
        }
        ProviderAction::GetSecret
        | ProviderAction::SetSecret
        | ProviderAction::DeleteSecret
        | ProviderAction::GetDebugInfo => return None,
    };
    Some(handler)
}

fn module_default(action: ModuleAction) -> Option<Arc<dyn ActionHandler>> {
    let handler = match action {
        ModuleAction::DescribeType => handler_fn(|_input| async {
            respond(&ModuleTypeDescription {
                docs: String::new(),
                schema: json!({}),
                outputs_schema: Some(json!({})),
            })
        }),
        ModuleAction::GetBuildStatus => {
            handler_fn(|_input| async { respond(&BuildStatus { ready: false }) })
        }
        ModuleAction::Publish => handler_fn(|input| async move {
            respond(&PublishResult {
                published: false,
                message: Some(format!(
                    "No publish handler available for module type {}",
                    module_type_of(&input)
                )),
            })
        }),
        ModuleAction::GetTestResult | ModuleAction::GetTaskResult => {
            handler_fn(|_input| async { Ok(Some(Value::Null)) })
        }
        ModuleAction::DeleteService => handler_fn(|input| async move {
            input.log.set_error(format!(
                "No delete service handler available for module type {}",
                module_type_of(&input)
            ));
            Ok(Some(json!({})))
        }),
        ModuleAction::GetServiceLogs => handler_fn(|input| async move {
            input.log.warn(format!(
                "No handler for log retrieval available for module type {}",
                module_type_of(&input)
            ));
            Ok(Some(json!({})))
        }),
        ModuleAction::Build
        | ModuleAction::RunModule
        | ModuleAction::TestModule
        | ModuleAction::GetServiceStatus
        | ModuleAction::DeployService
        | ModuleAction::HotReloadService
        | ModuleAction::ExecInService
        | ModuleAction::RunService
        | ModuleAction::RunTask => return None,
    };
    Some(handler)
}

fn module_type_of(input: &ActionInput) -> String {
    input.module_type().unwrap_or("unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_exist_only_for_fallback_actions() {
        let with_defaults: Vec<&str> = ActionKind::all()
            .filter(|kind| has_default(*kind))
            .map(|kind| kind.name())
            .collect();

        assert_eq!(
            with_defaults,
            vec![
                "getEnvironmentStatus",
                "prepareEnvironment",
                "cleanupEnvironment",
                "describeType",
                "getBuildStatus",
                "publish",
                "getTestResult",
                "deleteService",
                "getServiceLogs",
                "getTaskResult",
            ]
        );
    }
}
