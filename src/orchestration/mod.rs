//! # Orchestration Engine
//!
//! Resolution and dispatch of plugin actions.
//!
//! ## Core Components
//!
//! - **ActionDispatcher**: public entry point, one method per action plus composite workflows
//! - **ActionResolver**: selects the handler for a request (override order, defaults, errors)
//! - **ContextInjector**: composes the handler input from provider context, log and parameters
//! - **Collaborators**: boundaries to the configuration graph, providers, plugin loader,
//!   runtime context builder and build staging
//!
//! ## Data Flow
//!
//! ```text
//! ActionDispatcher ──► ActionResolver ──► HandlerRegistry
//!        │
//!        └──► ContextInjector ──► ValidatedHandler ──► caller
//! ```

pub mod collaborators;
pub mod context;
pub mod dispatcher;
pub mod requests;
pub mod resolver;

pub use collaborators::{
    BuildStager, Collaborators, ConfigGraph, PluginLoader, ProviderResolver, RuntimeContextBuilder,
};
pub use context::{ActionInput, ActionTarget, CommonParams, ContextInjector};
pub use dispatcher::ActionDispatcher;
pub use requests::{DeployServicesRequest, ModuleRequest, ProviderRequest, ServiceRequest, TaskRequest};
pub use resolver::ActionResolver;
