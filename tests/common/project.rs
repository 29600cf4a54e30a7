use action_router::config::EngineConfig;
use action_router::logging::LogEntry;
use action_router::models::{Module, PluginContext, Provider, RuntimeContext, Service};
use action_router::orchestration::{
    ActionDispatcher, BuildStager, Collaborators, ConfigGraph, PluginLoader, ProviderResolver,
    RuntimeContextBuilder,
};
use action_router::plugin::Plugin;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub const PROJECT_NAME: &str = "demo";
pub const ENVIRONMENT: &str = "local";

/// In-memory stand-in for the configuration graph, provider resolver, plugin
/// loader, runtime context builder and build stager.
#[derive(Debug, Default)]
pub struct InMemoryProject {
    providers: Vec<Provider>,
    services: Vec<Service>,
    /// Plugins the loader was asked to initialize, in call order.
    pub loaded_plugins: Mutex<Vec<String>>,
    /// `src:<module>` / `deps:<module>` for every staging sync, in call order.
    pub staged: Mutex<Vec<String>>,
}

impl InMemoryProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: &str) -> Self {
        self.providers.push(Provider::new(name));
        self
    }

    /// A service in its own module, named after the service.
    pub fn with_service(self, name: &str, module_type: &str) -> Self {
        self.with_module_service(name, name, module_type)
    }

    /// A service belonging to `module_name`; several services may share one module.
    pub fn with_module_service(mut self, name: &str, module_name: &str, module_type: &str) -> Self {
        let module = Module::new(module_name, module_type, "v-0001");
        self.services.push(Service::new(name, module));
        self
    }

    pub fn service(&self, name: &str) -> Service {
        self.services
            .iter()
            .find(|service| service.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("no service named {name}"))
    }

    pub fn module(&self, name: &str) -> Module {
        self.service(name).module
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            graph: self.clone(),
            providers: self.clone(),
            plugins: self.clone(),
            runtime: self.clone(),
            build_stager: self.clone(),
        }
    }

    pub fn dispatcher(self: &Arc<Self>, plugins: Vec<Plugin>) -> ActionDispatcher {
        let config = EngineConfig::for_environment(ENVIRONMENT, PROJECT_NAME);
        ActionDispatcher::new(&config, plugins, self.collaborators())
            .expect("dispatcher should build")
    }
}

#[async_trait]
impl ConfigGraph for InMemoryProject {
    async fn get_services(&self, names: Option<&[String]>) -> anyhow::Result<Vec<Service>> {
        match names {
            None => Ok(self.services.clone()),
            Some(names) => names
                .iter()
                .map(|name| {
                    self.services
                        .iter()
                        .find(|service| &service.name == name)
                        .cloned()
                        .ok_or_else(|| anyhow::anyhow!("Could not find service(s): {name}"))
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ProviderResolver for InMemoryProject {
    async fn resolve_providers(&self) -> anyhow::Result<Vec<Provider>> {
        Ok(self.providers.clone())
    }

    async fn resolve_provider(&self, name: &str) -> anyhow::Result<Provider> {
        self.providers
            .iter()
            .find(|provider| provider.name == name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Could not find provider '{name}'"))
    }

    fn get_plugin_context(&self, provider: &Provider) -> PluginContext {
        PluginContext {
            project_name: PROJECT_NAME.to_string(),
            environment_name: ENVIRONMENT.to_string(),
            provider: provider.clone(),
        }
    }
}

#[async_trait]
impl PluginLoader for InMemoryProject {
    async fn get_plugin(&self, name: &str) -> anyhow::Result<()> {
        self.loaded_plugins.lock().push(name.to_string());
        Ok(())
    }
}

#[async_trait]
impl RuntimeContextBuilder for InMemoryProject {
    async fn runtime_context(&self, service: &Service) -> anyhow::Result<RuntimeContext> {
        let mut context = RuntimeContext::default();
        context
            .env_vars
            .insert("SERVICE_NAME".to_string(), service.name.clone());
        Ok(context)
    }
}

#[async_trait]
impl BuildStager for InMemoryProject {
    async fn sync_from_src(&self, module: &Module, _log: &LogEntry) -> anyhow::Result<()> {
        self.staged.lock().push(format!("src:{}", module.name));
        Ok(())
    }

    async fn sync_dependency_products(&self, module: &Module, _log: &LogEntry) -> anyhow::Result<()> {
        self.staged.lock().push(format!("deps:{}", module.name));
        Ok(())
    }
}
