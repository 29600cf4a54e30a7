//! Boundaries to the systems around the engine.
//!
//! The engine never computes topology, loads configuration or stages build
//! sources itself. It asks these collaborators, which the host application
//! implements.

use crate::logging::LogEntry;
use crate::models::{Module, PluginContext, Provider, RuntimeContext, Service};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Enumerates the configured services.
#[async_trait]
pub trait ConfigGraph: Send + Sync + fmt::Debug {
    /// All services, or only those named. Unknown names are an error.
    async fn get_services(&self, names: Option<&[String]>) -> anyhow::Result<Vec<Service>>;
}

/// Resolves configured providers for the current environment.
#[async_trait]
pub trait ProviderResolver: Send + Sync + fmt::Debug {
    /// All providers in dependency order. A provider appears after every
    /// provider it depends on.
    async fn resolve_providers(&self) -> anyhow::Result<Vec<Provider>>;

    async fn resolve_provider(&self, name: &str) -> anyhow::Result<Provider>;

    fn get_plugin_context(&self, provider: &Provider) -> PluginContext;
}

/// Initializes plugins on demand.
#[async_trait]
pub trait PluginLoader: Send + Sync + fmt::Debug {
    async fn get_plugin(&self, name: &str) -> anyhow::Result<()>;
}

/// Computes the runtime context of a service from its dependencies.
#[async_trait]
pub trait RuntimeContextBuilder: Send + Sync + fmt::Debug {
    async fn runtime_context(&self, service: &Service) -> anyhow::Result<RuntimeContext>;
}

/// Keeps the build staging area in sync with module sources.
#[async_trait]
pub trait BuildStager: Send + Sync + fmt::Debug {
    async fn sync_from_src(&self, module: &Module, log: &LogEntry) -> anyhow::Result<()>;

    async fn sync_dependency_products(&self, module: &Module, log: &LogEntry)
        -> anyhow::Result<()>;
}

/// Every collaborator the dispatcher needs.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub graph: Arc<dyn ConfigGraph>,
    pub providers: Arc<dyn ProviderResolver>,
    pub plugins: Arc<dyn PluginLoader>,
    pub runtime: Arc<dyn RuntimeContextBuilder>,
    pub build_stager: Arc<dyn BuildStager>,
}
