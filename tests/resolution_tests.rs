//! End-to-end resolution through the dispatcher: override order, plugin filters,
//! defaults and configuration errors.

mod common;

use action_router::actions::{ModuleAction, ProviderAction};
use action_router::error::{ActionError, PluginError, PluginErrorKind};
use action_router::logging::LogEntry;
use action_router::models::{
    BuildModuleParams, GetEnvironmentStatusParams, GetSecretParams, GetTestResultParams,
    PublishModuleParams, RunModuleParams,
};
use action_router::orchestration::{ModuleRequest, ProviderRequest};
use action_router::plugin::{handler_fn, Plugin};
use action_router::DEFAULT_PROVIDER_NAME;
use common::*;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn build_plugins() -> Vec<Plugin> {
    vec![
        Plugin::builder("base")
            .module_action(
                "container",
                ModuleAction::Build,
                static_handler(json!({ "buildLog": "built by base" })),
            )
            .build(),
        Plugin::builder("override")
            .module_action(
                "container",
                ModuleAction::Build,
                static_handler(json!({ "buildLog": "built by override" })),
            )
            .build(),
    ]
}

#[tokio::test]
async fn test_later_plugin_overrides_earlier_plugin() {
    let project = Arc::new(
        InMemoryProject::new()
            .with_provider("base")
            .with_provider("override")
            .with_service("api", "container"),
    );
    let dispatcher = project.dispatcher(build_plugins());

    let result = dispatcher
        .build(ModuleRequest::new(project.module("api"), LogEntry::root(), BuildModuleParams {}))
        .await
        .unwrap();
    assert_eq!(result.build_log.as_deref(), Some("built by override"));

    let result = dispatcher
        .build(
            ModuleRequest::new(project.module("api"), LogEntry::root(), BuildModuleParams {})
                .with_plugin("base"),
        )
        .await
        .unwrap();
    assert_eq!(result.build_log.as_deref(), Some("built by base"));
    assert_eq!(*project.loaded_plugins.lock(), vec!["base".to_string()]);
}

#[tokio::test]
async fn test_get_test_result_falls_back_to_null_default() {
    let project = Arc::new(InMemoryProject::new().with_service("worker", "generic"));
    let dispatcher = project.dispatcher(build_plugins());

    let result = dispatcher
        .get_test_result(ModuleRequest::new(
            project.module("worker"),
            LogEntry::root(),
            GetTestResultParams {
                test_name: "unit".to_string(),
                test_version: "v-0001".to_string(),
            },
        ))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_publish_default_reports_missing_handler() {
    let project = Arc::new(InMemoryProject::new().with_service("api", "container"));
    let dispatcher = project.dispatcher(build_plugins());

    let result = dispatcher
        .publish_module(ModuleRequest::new(project.module("api"), LogEntry::root(), PublishModuleParams {}))
        .await
        .unwrap();

    assert!(!result.published);
    assert_eq!(
        result.message.as_deref(),
        Some("No publish handler available for module type container")
    );
}

#[tokio::test]
async fn test_describe_type_default_accepts_anything() {
    let project = Arc::new(InMemoryProject::new());
    let dispatcher = project.dispatcher(Vec::new());

    let description = dispatcher
        .describe_type("terraform", &LogEntry::root())
        .await
        .unwrap();

    assert_eq!(description.docs, "");
    assert_eq!(description.schema, json!({}));
}

#[tokio::test]
async fn test_missing_handler_without_plugin_is_parameter_error() {
    let project = Arc::new(InMemoryProject::new().with_service("api", "container"));
    let dispatcher = project.dispatcher(build_plugins());

    let error = dispatcher
        .run_module(ModuleRequest::new(project.module("api"), LogEntry::root(), RunModuleParams::default()))
        .await
        .unwrap_err();

    assert!(error.is_parameter());
    assert_eq!(
        error.to_string(),
        "No 'runModule' handler configured for module type 'container' in environment 'local'. \
         Are you missing a provider configuration?"
    );
}

#[tokio::test]
async fn test_missing_handler_with_plugin_is_plugin_error() {
    let project = Arc::new(InMemoryProject::new().with_provider("base"));
    let dispatcher = project.dispatcher(build_plugins());

    let error = dispatcher
        .get_secret(ProviderRequest::new(
            "base",
            LogEntry::root(),
            GetSecretParams {
                key: "token".to_string(),
            },
        ))
        .await
        .unwrap_err();

    match error {
        ActionError::Plugin(PluginError {
            plugin,
            kind: PluginErrorKind::MissingHandler,
            ..
        }) => assert_eq!(plugin, "base"),
        other => panic!("expected missing handler error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handlers_receive_owning_provider_context() {
    let project = Arc::new(InMemoryProject::new().with_provider("local-k8s"));
    let plugin = Plugin::builder("local-k8s")
        .action(
            ProviderAction::GetEnvironmentStatus,
            handler_fn(|input| async move {
                Ok(Some(json!({
                    "ready": true,
                    "outputs": {
                        "provider": input.ctx.provider.name,
                        "project": input.ctx.project_name,
                        "environment": input.ctx.environment_name,
                    }
                })))
            }),
        )
        .build();
    let dispatcher = project.dispatcher(vec![plugin]);

    let status = dispatcher
        .get_environment_status(ProviderRequest::new(
            "local-k8s",
            LogEntry::root(),
            GetEnvironmentStatusParams {},
        ))
        .await
        .unwrap();

    assert!(status.ready);
    assert_eq!(status.outputs["provider"], json!("local-k8s"));
    assert_eq!(status.outputs["project"], json!(PROJECT_NAME));
    assert_eq!(status.outputs["environment"], json!(ENVIRONMENT));
}

#[tokio::test]
async fn test_default_handlers_run_under_default_provider() {
    let project = Arc::new(InMemoryProject::new().with_provider("exec"));
    let dispatcher = project.dispatcher(Vec::new());

    let status = dispatcher
        .get_environment_status(ProviderRequest::new("exec", LogEntry::root(), GetEnvironmentStatusParams {}))
        .await
        .unwrap();
    assert!(status.ready);
    assert!(status.outputs.is_empty());

    let chain = dispatcher
        .registry()
        .override_chain(ProviderAction::GetEnvironmentStatus.into(), None);
    assert_eq!(chain.effective_plugin(), Some(DEFAULT_PROVIDER_NAME));
}

fn actions_without_default() -> impl Strategy<Value = ModuleAction> {
    prop::sample::select(vec![
        ModuleAction::Build,
        ModuleAction::RunModule,
        ModuleAction::TestModule,
        ModuleAction::GetServiceStatus,
        ModuleAction::DeployService,
        ModuleAction::HotReloadService,
        ModuleAction::ExecInService,
        ModuleAction::RunService,
        ModuleAction::RunTask,
    ])
}

proptest! {
    #[test]
    fn prop_unregistered_actions_fail_by_filter(
        action in actions_without_default(),
        module_type in "[a-z]{3,10}",
        plugin in proptest::option::of("[a-z]{3,8}"),
    ) {
        let project = Arc::new(InMemoryProject::new());
        let dispatcher = project.dispatcher(Vec::new());

        let error = tokio_test::block_on(
            dispatcher
                .resolver()
                .resolve_module_action(action, &module_type, plugin.as_deref()),
        )
        .unwrap_err();

        match plugin {
            Some(name) => {
                prop_assert!(error.is_plugin());
                prop_assert_eq!(error.plugin_name(), Some(name.as_str()));
            }
            None => prop_assert!(error.is_parameter()),
        }
    }
}
