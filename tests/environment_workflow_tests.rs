//! Environment-wide workflows: aggregate status, teardown ordering, debug info
//! and the provider secret actions.

mod common;

use action_router::actions::{ModuleAction, ProviderAction};
use action_router::logging::{EntryStatus, LogEntry};
use action_router::models::{
    DeleteSecretParams, GetSecretParams, GetTaskResultParams, PrepareEnvironmentParams,
    ServiceState, SetSecretParams, Task,
};
use action_router::orchestration::{ProviderRequest, TaskRequest};
use action_router::plugin::{handler_fn, Plugin};
use common::*;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn project() -> Arc<InMemoryProject> {
    Arc::new(
        InMemoryProject::new()
            .with_provider("container")
            .with_provider("cloud")
            .with_service("api", "container")
            .with_service("db", "container"),
    )
}

#[tokio::test]
async fn test_provider_cleanup_waits_for_every_service_deletion() {
    let project = project();
    let recorder = EventRecorder::new();
    let plugins = vec![
        Plugin::builder("container")
            .module_action(
                "container",
                ModuleAction::GetServiceStatus,
                static_handler(json!({ "state": "ready" })),
            )
            .module_action(
                "container",
                ModuleAction::DeleteService,
                recording_handler(
                    recorder.clone(),
                    "delete",
                    Duration::from_millis(50),
                    json!({ "state": "missing" }),
                ),
            )
            .action(
                ProviderAction::CleanupEnvironment,
                recording_handler(recorder.clone(), "cleanup", Duration::ZERO, json!({})),
            )
            .build(),
        Plugin::builder("cloud")
            .action(
                ProviderAction::CleanupEnvironment,
                recording_handler(recorder.clone(), "cleanup", Duration::ZERO, json!({})),
            )
            .action(
                ProviderAction::GetEnvironmentStatus,
                static_handler(json!({ "ready": false, "outputs": {} })),
            )
            .build(),
    ];
    let dispatcher = project.dispatcher(plugins);
    let log = LogEntry::root();

    let teardown = dispatcher.delete_environment(&log).await.unwrap();

    let last_delete = ["end:delete:api", "end:delete:db"]
        .iter()
        .map(|event| recorder.position(event))
        .max()
        .unwrap();
    for cleanup in ["start:cleanup:container", "start:cleanup:cloud"] {
        assert!(
            recorder.position(cleanup) > last_delete,
            "{cleanup} started before deletions settled: {:?}",
            recorder.events()
        );
    }

    assert_eq!(teardown.service_statuses.len(), 2);
    assert!(teardown
        .service_statuses
        .values()
        .all(|status| status.state == Some(ServiceState::Missing)));
    assert!(teardown.environment_statuses["container"].ready);
    assert!(!teardown.environment_statuses["cloud"].ready);

    let sections: Vec<_> = log.children().iter().filter_map(|entry| entry.section()).collect();
    assert_eq!(sections, vec!["services".to_string(), "providers".to_string()]);
    assert!(log
        .children()
        .iter()
        .all(|entry| entry.status() == Some(EntryStatus::Success)));
}

#[tokio::test]
async fn test_failed_deletion_skips_provider_cleanup() {
    let project = project();
    let cleanups = CallCounter::new();
    let plugin = Plugin::builder("container")
        .module_action(
            "container",
            ModuleAction::GetServiceStatus,
            static_handler(json!({ "state": "ready" })),
        )
        .module_action("container", ModuleAction::DeleteService, failing_handler("volume busy"))
        .action(
            ProviderAction::CleanupEnvironment,
            counting_handler(cleanups.clone(), json!({})),
        )
        .build();
    let dispatcher = project.dispatcher(vec![plugin]);

    let error = dispatcher.delete_environment(&LogEntry::root()).await.unwrap_err();

    assert!(error.to_string().contains("volume busy"));
    assert_eq!(cleanups.count(), 0);
}

#[tokio::test]
async fn test_get_status_combines_providers_and_services() {
    let project = project();
    let plugin = Plugin::builder("container")
        .module_action(
            "container",
            ModuleAction::GetServiceStatus,
            static_handler(json!({ "state": "deploying" })),
        )
        .action(
            ProviderAction::GetEnvironmentStatus,
            static_handler(json!({ "ready": true, "outputs": { "namespace": "demo-local" } })),
        )
        .build();
    let dispatcher = project.dispatcher(vec![plugin]);

    let status = dispatcher.get_status(&LogEntry::root()).await.unwrap();

    assert_eq!(status.providers.len(), 2);
    assert_eq!(status.providers["container"].outputs["namespace"], json!("demo-local"));
    assert!(status.providers["cloud"].outputs.is_empty());
    assert_eq!(status.services.len(), 2);
    assert_eq!(status.services["db"].state, Some(ServiceState::Deploying));
}

#[tokio::test]
async fn test_debug_info_is_collected_from_every_implementing_plugin() {
    let project = project();
    let plugins = vec![
        Plugin::builder("container")
            .action(
                ProviderAction::GetDebugInfo,
                handler_fn(|input| async move {
                    Ok(Some(json!({ "info": { "provider": input.ctx.provider.name } })))
                }),
            )
            .build(),
        Plugin::builder("cloud")
            .action(
                ProviderAction::GetDebugInfo,
                static_handler(json!({ "info": { "region": "eu-west-1" } })),
            )
            .build(),
        Plugin::builder("silent").build(),
    ];
    let dispatcher = project.dispatcher(plugins);

    let info = dispatcher.get_debug_info(&LogEntry::root()).await.unwrap();

    assert_eq!(info.len(), 2);
    assert_eq!(info["container"].info, json!({ "provider": "container" }));
    assert_eq!(info["cloud"].info["region"], json!("eu-west-1"));
    assert!(!info.contains_key("silent"));
}

#[tokio::test]
async fn test_debug_info_without_implementations_is_empty() {
    let project = project();
    let dispatcher = project.dispatcher(Vec::new());

    let info = dispatcher.get_debug_info(&LogEntry::root()).await.unwrap();

    assert!(info.is_empty());
}

fn secret_store_plugin(store: Arc<Mutex<HashMap<String, String>>>) -> Plugin {
    let get_store = store.clone();
    let set_store = store.clone();
    let delete_store = store;

    Plugin::builder("cloud")
        .action(
            ProviderAction::GetSecret,
            handler_fn(move |input| {
                let store = get_store.clone();
                async move {
                    let value = match &input.params {
                        action_router::models::ActionParams::GetSecret(params) => {
                            store.lock().get(&params.key).cloned()
                        }
                        _ => None,
                    };
                    Ok(Some(json!({ "value": value })))
                }
            }),
        )
        .action(
            ProviderAction::SetSecret,
            handler_fn(move |input| {
                let store = set_store.clone();
                async move {
                    if let action_router::models::ActionParams::SetSecret(params) = &input.params {
                        store.lock().insert(params.key.clone(), params.value.clone());
                    }
                    Ok(Some(json!({})))
                }
            }),
        )
        .action(
            ProviderAction::DeleteSecret,
            handler_fn(move |input| {
                let store = delete_store.clone();
                async move {
                    let found = match &input.params {
                        action_router::models::ActionParams::DeleteSecret(params) => {
                            store.lock().remove(&params.key).is_some()
                        }
                        _ => false,
                    };
                    Ok(Some(json!({ "found": found })))
                }
            }),
        )
        .build()
}

#[tokio::test]
async fn test_secret_lifecycle() {
    let project = project();
    let store = Arc::new(Mutex::new(HashMap::new()));
    let dispatcher = project.dispatcher(vec![secret_store_plugin(store.clone())]);
    let get = |key: &str| {
        ProviderRequest::new(
            "cloud",
            LogEntry::root(),
            GetSecretParams {
                key: key.to_string(),
            },
        )
    };

    assert_eq!(dispatcher.get_secret(get("token")).await.unwrap().value, None);

    dispatcher
        .set_secret(ProviderRequest::new(
            "cloud",
            LogEntry::root(),
            SetSecretParams {
                key: "token".to_string(),
                value: "s3cret".to_string(),
            },
        ))
        .await
        .unwrap();
    assert_eq!(store.lock().get("token").map(String::as_str), Some("s3cret"));
    assert_eq!(
        dispatcher.get_secret(get("token")).await.unwrap().value.as_deref(),
        Some("s3cret")
    );

    let delete = |key: &str| {
        ProviderRequest::new(
            "cloud",
            LogEntry::root(),
            DeleteSecretParams {
                key: key.to_string(),
            },
        )
    };
    assert!(dispatcher.delete_secret(delete("token")).await.unwrap().found);
    assert!(!dispatcher.delete_secret(delete("token")).await.unwrap().found);
}

#[tokio::test]
async fn test_prepare_environment_default_reports_ready() {
    let project = project();
    let dispatcher = project.dispatcher(Vec::new());

    let result = dispatcher
        .prepare_environment(ProviderRequest::new(
            "container",
            LogEntry::root(),
            PrepareEnvironmentParams { force: false },
        ))
        .await
        .unwrap();

    assert!(result.status.ready);
}

#[tokio::test]
async fn test_task_result_defaults_to_none() {
    let project = project();
    let dispatcher = project.dispatcher(Vec::new());
    let task = Task::new("migrate", project.module("db"));

    let result = dispatcher
        .get_task_result(TaskRequest::new(
            task,
            LogEntry::root(),
            GetTaskResultParams {
                task_version: "v-0001".to_string(),
            },
        ))
        .await
        .unwrap();

    assert!(result.is_none());
}
