//! Request envelopes for dispatcher calls.
//!
//! Each envelope pairs the caller's action parameters with the entity the
//! action targets, the caller's log entry and an optional plugin override.

use crate::logging::LogEntry;
use crate::models::{Module, RuntimeContext, Service, Task};

/// Environment-level request addressed to one provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest<P> {
    pub plugin_name: String,
    pub log: LogEntry,
    pub params: P,
}

impl<P> ProviderRequest<P> {
    pub fn new(plugin_name: impl Into<String>, log: LogEntry, params: P) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            log,
            params,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModuleRequest<P> {
    pub module: Module,
    pub log: LogEntry,
    pub plugin_name: Option<String>,
    pub params: P,
}

impl<P> ModuleRequest<P> {
    pub fn new(module: Module, log: LogEntry, params: P) -> Self {
        Self {
            module,
            log,
            plugin_name: None,
            params,
        }
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin_name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServiceRequest<P> {
    pub service: Service,
    pub runtime_context: Option<RuntimeContext>,
    pub log: LogEntry,
    pub plugin_name: Option<String>,
    pub params: P,
}

impl<P> ServiceRequest<P> {
    pub fn new(service: Service, log: LogEntry, params: P) -> Self {
        Self {
            service,
            runtime_context: None,
            log,
            plugin_name: None,
            params,
        }
    }

    #[must_use]
    pub fn with_runtime_context(mut self, runtime_context: RuntimeContext) -> Self {
        self.runtime_context = Some(runtime_context);
        self
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin_name.into());
        self
    }

    /// Same service, runtime context and plugin override with different parameters.
    pub(crate) fn derive<Q>(&self, log: LogEntry, params: Q) -> ServiceRequest<Q> {
        ServiceRequest {
            service: self.service.clone(),
            runtime_context: self.runtime_context.clone(),
            log,
            plugin_name: self.plugin_name.clone(),
            params,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskRequest<P> {
    pub task: Task,
    pub runtime_context: Option<RuntimeContext>,
    pub log: LogEntry,
    pub plugin_name: Option<String>,
    pub params: P,
}

impl<P> TaskRequest<P> {
    pub fn new(task: Task, log: LogEntry, params: P) -> Self {
        Self {
            task,
            runtime_context: None,
            log,
            plugin_name: None,
            params,
        }
    }

    #[must_use]
    pub fn with_runtime_context(mut self, runtime_context: RuntimeContext) -> Self {
        self.runtime_context = Some(runtime_context);
        self
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = Some(plugin_name.into());
        self
    }
}

/// Selection and flags for deploying a set of services.
#[derive(Debug, Clone, Default)]
pub struct DeployServicesRequest {
    /// Services to deploy; all configured services when `None`.
    pub service_names: Option<Vec<String>>,
    pub force: bool,
    pub force_build: bool,
    pub log: LogEntry,
}
