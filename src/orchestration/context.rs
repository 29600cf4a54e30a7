//! # Context Injection
//!
//! Every handler receives an [`ActionInput`] composed from three parts:
//!
//! ```text
//! CommonParams ─┐  ctx (owning provider) + log
//! ActionTarget ─┼─► ActionInput
//! ActionParams ─┘  caller-supplied, action specific
//! ```
//!
//! Composition is structural, so caller parameters cannot shadow `ctx` or `log`.
//! Modules are always passed sanitized.

use crate::constants::DEFAULT_PROVIDER_NAME;
use crate::error::{ActionError, ActionResult};
use crate::logging::LogEntry;
use crate::models::{ActionParams, Module, PluginContext, Provider, RuntimeContext, Service, Task};
use crate::orchestration::collaborators::ProviderResolver;
use std::sync::Arc;
use tracing::trace;

/// Parameters shared by every handler call.
#[derive(Debug, Clone)]
pub struct CommonParams {
    pub ctx: PluginContext,
    pub log: LogEntry,
}

/// The entity an action is performed on.
#[derive(Debug, Clone)]
pub enum ActionTarget {
    Environment,
    ModuleType(String),
    Module(Module),
    Service {
        module: Module,
        service: Service,
        runtime_context: Option<RuntimeContext>,
    },
    Task {
        module: Module,
        task: Task,
        runtime_context: Option<RuntimeContext>,
    },
}

impl ActionTarget {
    pub fn module(module: &Module) -> Self {
        ActionTarget::Module(module.sanitized())
    }

    pub fn service(service: &Service, runtime_context: Option<RuntimeContext>) -> Self {
        let module = service.module.sanitized();
        let service = Service {
            module: module.clone(),
            ..service.clone()
        };
        ActionTarget::Service {
            module,
            service,
            runtime_context,
        }
    }

    pub fn task(task: &Task, runtime_context: Option<RuntimeContext>) -> Self {
        let module = task.module.sanitized();
        let task = Task {
            module: module.clone(),
            ..task.clone()
        };
        ActionTarget::Task {
            module,
            task,
            runtime_context,
        }
    }
}

/// Full input for one handler call.
#[derive(Debug, Clone)]
pub struct ActionInput {
    pub ctx: PluginContext,
    pub log: LogEntry,
    pub target: ActionTarget,
    pub params: ActionParams,
}

impl ActionInput {
    pub fn compose(
        common: CommonParams,
        target: ActionTarget,
        params: impl Into<ActionParams>,
    ) -> Self {
        Self {
            ctx: common.ctx,
            log: common.log,
            target,
            params: params.into(),
        }
    }

    pub fn module(&self) -> Option<&Module> {
        match &self.target {
            ActionTarget::Module(module)
            | ActionTarget::Service { module, .. }
            | ActionTarget::Task { module, .. } => Some(module),
            ActionTarget::Environment | ActionTarget::ModuleType(_) => None,
        }
    }

    pub fn module_type(&self) -> Option<&str> {
        match &self.target {
            ActionTarget::ModuleType(module_type) => Some(module_type),
            _ => self.module().map(|module| module.module_type.as_str()),
        }
    }

    pub fn service(&self) -> Option<&Service> {
        match &self.target {
            ActionTarget::Service { service, .. } => Some(service),
            _ => None,
        }
    }

    pub fn task(&self) -> Option<&Task> {
        match &self.target {
            ActionTarget::Task { task, .. } => Some(task),
            _ => None,
        }
    }

    pub fn runtime_context(&self) -> Option<&RuntimeContext> {
        match &self.target {
            ActionTarget::Service {
                runtime_context, ..
            }
            | ActionTarget::Task {
                runtime_context, ..
            } => runtime_context.as_ref(),
            _ => None,
        }
    }
}

/// Builds [`CommonParams`] for the provider that owns a handler.
#[derive(Debug, Clone)]
pub struct ContextInjector {
    providers: Arc<dyn ProviderResolver>,
}

impl ContextInjector {
    pub fn new(providers: Arc<dyn ProviderResolver>) -> Self {
        Self { providers }
    }

    /// Resolve the owning provider of `plugin_name` and attach the caller's log.
    ///
    /// Handlers tagged with the default provider never hit the resolver.
    pub async fn common_params(&self, plugin_name: &str, log: &LogEntry) -> ActionResult<CommonParams> {
        let provider = if plugin_name == DEFAULT_PROVIDER_NAME {
            Provider::default_provider()
        } else {
            self.providers
                .resolve_provider(plugin_name)
                .await
                .map_err(|e| ActionError::collaborator(format!("resolve provider '{plugin_name}'"), e))?
        };

        trace!(provider = %provider.name, "Injecting plugin context");

        Ok(CommonParams {
            ctx: self.providers.get_plugin_context(&provider),
            log: log.clone(),
        })
    }

    pub async fn prepare(
        &self,
        plugin_name: &str,
        log: &LogEntry,
        target: ActionTarget,
        params: impl Into<ActionParams>,
    ) -> ActionResult<ActionInput> {
        let common = self.common_params(plugin_name, log).await?;
        Ok(ActionInput::compose(common, target, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeleteServiceParams, DescribeTypeParams};
    use serde_json::json;

    fn context() -> CommonParams {
        CommonParams {
            ctx: PluginContext {
                project_name: "demo".to_string(),
                environment_name: "local".to_string(),
                provider: Provider::new("container"),
            },
            log: LogEntry::root(),
        }
    }

    #[test]
    fn test_service_target_carries_sanitized_module() {
        let module = Module::new("api", "container", "v-1")
            .with_provider_internal("_ConfigType", json!("internal"));
        let service = Service::new("api", module);

        let target = ActionTarget::service(&service, Some(RuntimeContext::default()));
        let input = ActionInput::compose(context(), target, DeleteServiceParams {});

        assert!(input.module().unwrap().provider_internals.is_empty());
        assert!(input.service().unwrap().module.provider_internals.is_empty());
        assert_eq!(input.module_type(), Some("container"));
        assert!(input.runtime_context().is_some());
        assert!(input.task().is_none());
    }

    #[test]
    fn test_module_type_target_exposes_type_only() {
        let input = ActionInput::compose(
            context(),
            ActionTarget::ModuleType("helm".to_string()),
            DescribeTypeParams {},
        );
        assert_eq!(input.module_type(), Some("helm"));
        assert!(input.module().is_none());
        assert_eq!(input.ctx.provider.name, "container");
    }
}
