//! Central table of action descriptions and result schemas.
//!
//! Schemas are JSON Schema draft 7 documents. They describe the wire shape
//! (camelCase keys) that the typed result structs in
//! [`models::results`](crate::models::results) deserialize from.

use super::{ActionKind, ModuleAction, ProviderAction};
use serde_json::{json, Value};

/// Static description of one action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub description: &'static str,
    pub result_schema: Value,
}

/// Look up the descriptor for an action.
pub fn descriptor(kind: ActionKind) -> ActionDescriptor {
    let (description, result_schema) = match kind {
        ActionKind::Provider(action) => provider_entry(action),
        ActionKind::Module(action) => module_entry(action),
    };

    ActionDescriptor {
        kind,
        description,
        result_schema,
    }
}

fn provider_entry(action: ProviderAction) -> (&'static str, Value) {
    match action {
        ProviderAction::GetEnvironmentStatus => (
            "Check if the current environment is ready for use by this plugin.",
            environment_status_schema(),
        ),
        ProviderAction::PrepareEnvironment => (
            "Make sure the environment is set up for this plugin.",
            json!({
                "type": "object",
                "properties": { "status": environment_status_schema() },
                "required": ["status"]
            }),
        ),
        ProviderAction::CleanupEnvironment => (
            "Clean up any runtime components, services etc. that this plugin has deployed.",
            open_object(),
        ),
        ProviderAction::GetSecret => (
            "Retrieve a secret value for this plugin in the current environment.",
            json!({
                "type": "object",
                "properties": { "value": { "type": ["string", "null"] } },
                "required": ["value"]
            }),
        ),
        ProviderAction::SetSecret => (
            "Set a secret for this plugin in the current environment.",
            open_object(),
        ),
        ProviderAction::DeleteSecret => (
            "Remove a secret for this plugin in the current environment.",
            json!({
                "type": "object",
                "properties": { "found": { "type": "boolean" } },
                "required": ["found"]
            }),
        ),
        ProviderAction::GetDebugInfo => (
            "Collect debug information about the provider for troubleshooting.",
            json!({
                "type": "object",
                "properties": { "info": {} },
                "required": ["info"]
            }),
        ),
    }
}

fn module_entry(action: ModuleAction) -> (&'static str, Value) {
    match action {
        ModuleAction::DescribeType => (
            "Return documentation and schemas for a module type.",
            json!({
                "type": "object",
                "properties": {
                    "docs": { "type": "string" },
                    "schema": { "type": "object" },
                    "outputsSchema": { "type": "object" }
                },
                "required": ["docs", "schema"]
            }),
        ),
        ModuleAction::GetBuildStatus => (
            "Check if the module is already built for its current version.",
            json!({
                "type": "object",
                "properties": { "ready": { "type": "boolean" } },
                "required": ["ready"]
            }),
        ),
        ModuleAction::Build => (
            "Build the current version of a module.",
            json!({
                "type": "object",
                "properties": {
                    "buildLog": { "type": "string" },
                    "fetched": { "type": "boolean" },
                    "fresh": { "type": "boolean" },
                    "version": { "type": "string" },
                    "details": { "type": "object" }
                }
            }),
        ),
        ModuleAction::Publish => (
            "Publish a built module to a remote registry.",
            json!({
                "type": "object",
                "properties": {
                    "published": { "type": "boolean" },
                    "message": { "type": "string" }
                },
                "required": ["published"]
            }),
        ),
        ModuleAction::RunModule => (
            "Run an ad-hoc instance of the module.",
            run_result_schema(),
        ),
        ModuleAction::TestModule => (
            "Run the specified test for the module.",
            test_result_schema(),
        ),
        ModuleAction::GetTestResult => (
            "Retrieve the result of a previous test run, if any.",
            json!({ "anyOf": [{ "type": "null" }, test_result_schema()] }),
        ),
        ModuleAction::GetServiceStatus => (
            "Check and return the current runtime status of a service.",
            service_status_schema(),
        ),
        ModuleAction::DeployService => (
            "Deploy the specified service.",
            service_status_schema(),
        ),
        ModuleAction::HotReloadService => (
            "Synchronize changed source into a running service without redeploying.",
            open_object(),
        ),
        ModuleAction::DeleteService => (
            "Terminate a deployed service.",
            service_status_schema(),
        ),
        ModuleAction::ExecInService => (
            "Execute a command in a running service.",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "integer" },
                    "output": { "type": "string" },
                    "stdout": { "type": "string" },
                    "stderr": { "type": "string" }
                },
                "required": ["code", "output"]
            }),
        ),
        ModuleAction::GetServiceLogs => (
            "Stream log entries for a service to the supplied channel.",
            open_object(),
        ),
        ModuleAction::RunService => (
            "Run an ad-hoc instance of the service.",
            run_result_schema(),
        ),
        ModuleAction::RunTask => (
            "Run a task within the context of its module.",
            run_task_result_schema(),
        ),
        ModuleAction::GetTaskResult => (
            "Retrieve the result of a previous task run, if any.",
            json!({ "anyOf": [{ "type": "null" }, run_task_result_schema()] }),
        ),
    }
}

fn open_object() -> Value {
    json!({ "type": "object" })
}

fn environment_status_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ready": { "type": "boolean" },
            "needManualInit": { "type": "boolean" },
            "outputs": { "type": "object" },
            "detail": { "type": "object" }
        },
        "required": ["ready"]
    })
}

fn service_status_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "state": {
                "enum": ["ready", "deploying", "stopped", "unhealthy", "unknown", "outdated", "missing"]
            },
            "version": { "type": "string" },
            "runningReplicas": { "type": "integer", "minimum": 0 },
            "ingresses": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "hostname": { "type": "string" },
                        "path": { "type": "string" },
                        "port": { "type": "integer", "minimum": 0, "maximum": 65535 },
                        "protocol": { "enum": ["http", "https"] }
                    },
                    "required": ["path", "port", "protocol"]
                }
            },
            "lastMessage": { "type": "string" },
            "lastError": { "type": "string" },
            "createdAt": { "type": "string" },
            "updatedAt": { "type": "string" },
            "detail": { "type": "object" }
        }
    })
}

fn run_result_properties() -> serde_json::Map<String, Value> {
    let properties = json!({
        "moduleName": { "type": "string" },
        "command": { "type": "array", "items": { "type": "string" } },
        "version": { "type": "string" },
        "success": { "type": "boolean" },
        "startedAt": { "type": "string" },
        "completedAt": { "type": "string" },
        "output": { "type": "string" }
    });

    match properties {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

const RUN_RESULT_REQUIRED: [&str; 7] = [
    "moduleName",
    "command",
    "version",
    "success",
    "startedAt",
    "completedAt",
    "output",
];

fn run_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": run_result_properties(),
        "required": RUN_RESULT_REQUIRED
    })
}

fn test_result_schema() -> Value {
    let mut properties = run_result_properties();
    properties.insert("testName".to_string(), json!({ "type": "string" }));

    let mut required: Vec<&str> = RUN_RESULT_REQUIRED.to_vec();
    required.push("testName");

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn run_task_result_schema() -> Value {
    let mut properties = run_result_properties();
    properties.insert("taskName".to_string(), json!({ "type": "string" }));
    properties.insert("outputs".to_string(), json!({ "type": "object" }));

    let mut required: Vec<&str> = RUN_RESULT_REQUIRED.to_vec();
    required.extend(["taskName", "outputs"]);

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}
